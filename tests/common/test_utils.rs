#![allow(dead_code)]

use std::time::Duration;

use flow_fractal::{
    context::Context,
    data_structures::scene_graph::SceneGraph,
    flow::{Flow, Out},
    fractal::{Fractal, config::FractalConfig},
    resources::Assets,
};
use rand::{SeedableRng, rngs::StdRng};

pub const FRAME: Duration = Duration::from_millis(50);

pub fn config(max_depth: u32, spawn_probability: f32) -> FractalConfig {
    FractalConfig {
        max_depth,
        child_scale: 0.5,
        spawn_probability,
        max_rotation_speed: 60.0,
        max_twist: 20.0,
    }
}

/// No spin and no twist, so local transforms stay exactly where they were placed.
pub fn still_config(max_depth: u32, spawn_probability: f32) -> FractalConfig {
    FractalConfig {
        max_rotation_speed: 0.0,
        max_twist: 0.0,
        ..config(max_depth, spawn_probability)
    }
}

pub struct Grown {
    pub graph: SceneGraph,
    pub fractal: Fractal,
    pub rng: StdRng,
}

impl Grown {
    pub fn new(config: FractalConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut graph = SceneGraph::new();
        let fractal = Fractal::new(&mut graph, None, config, &Assets::default(), &mut rng)
            .expect("test config should be valid");
        Self {
            graph,
            fractal,
            rng,
        }
    }

    pub fn step(&mut self, dt: Duration) {
        self.fractal.update(&mut self.graph, &mut self.rng, dt);
    }

    pub fn run_for(&mut self, total: Duration, dt: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            self.step(dt);
            elapsed += dt;
        }
    }

    /// Steps until no spawn is pending anymore. Returns the number of frames.
    pub fn grow_fully(&mut self) -> usize {
        let mut frames = 0;
        while self.fractal.is_growing() {
            self.step(FRAME);
            frames += 1;
            assert!(frames < 10_000, "fractal never stopped growing");
        }
        frames
    }
}

pub fn assert_close(actual: f32, expected: f32, eps: f32) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {} but got {} (eps {})",
        expected,
        actual,
        eps
    );
}

pub fn assert_vec_close(actual: cgmath::Vector3<f32>, expected: cgmath::Vector3<f32>, eps: f32) {
    assert_close(actual.x, expected.x, eps);
    assert_close(actual.y, expected.y, eps);
    assert_close(actual.z, expected.z, eps);
}

pub fn assert_quat_close(actual: cgmath::Quaternion<f32>, expected: cgmath::Quaternion<f32>, eps: f32) {
    assert_close(actual.s, expected.s, eps);
    assert_vec_close(actual.v, expected.v, eps);
}

/// Counts lifecycle hook invocations of a flow.
pub(crate) struct State {
    frame_counter: u32,
    init_invocations: u32,
    update_invocations: u32,
    tick_invocations: u32,
    pub dummy_state: String,
}

impl State {
    pub fn new() -> Self {
        Self {
            frame_counter: 0,
            init_invocations: 0,
            update_invocations: 0,
            tick_invocations: 0,
            dummy_state: String::new(),
        }
    }

    pub fn frame(&mut self) {
        self.frame_counter += 1;
    }

    pub fn init(&mut self) {
        self.init_invocations += 1;
    }

    pub fn update(&mut self) {
        self.update_invocations += 1;
    }

    pub fn tick(&mut self) {
        self.tick_invocations += 1;
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn init_invocations(&self) -> u32 {
        self.init_invocations
    }

    pub fn update_invocations(&self) -> u32 {
        self.update_invocations
    }

    pub fn tick_invocations(&self) -> u32 {
        self.tick_invocations
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Flow that does nothing but pass events on.
pub(crate) struct Idle;

impl<S, E> Flow<S, E> for Idle {
    fn on_init(&mut self, _: &mut Context, _: &mut S) -> Out<S, E> {
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut S, _: Duration) -> Out<S, E> {
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut S) -> Out<S, E> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut S, event: E) -> Option<E> {
        Some(event)
    }
}
