use std::{pin::Pin, time::Duration};

use flow_fractal::{
    context::{Context, InitContext},
    data_structures::scene_graph::SceneGraph,
    flow::{App, Flow, FlowConstructor, Out, RunSettings},
    fractal::{
        config::FractalConfig,
        flow::{FractalEvent, FractalFlow, FractalStats},
    },
    resources::Assets,
};

use crate::common::test_utils::{FRAME, Idle, State, config};

mod common;

enum Event {
    Test,
}

struct Element;

impl Flow<State, Event> for Element {
    fn on_init(&mut self, _: &mut Context, state: &mut State) -> Out<State, Event> {
        assert_eq!(state.frame_counter(), 0);
        assert_eq!(state.init_invocations(), 0);
        assert_eq!(state.update_invocations(), 0);

        state.init();
        Out::Configure(Box::new(|ctx: &mut Context| ctx.tick_duration_millis = 100))
    }

    fn on_update(&mut self, _: &Context, state: &mut State, _: Duration) -> Out<State, Event> {
        assert_eq!(state.frame_counter(), state.update_invocations());
        assert_eq!(state.init_invocations(), 1);
        state.frame();
        state.update();

        let serve_sencha: Box<dyn FnOnce(&mut State)> = Box::new(|state: &mut State| {
            state.dummy_state.push('🍵');
        });
        let serve_mate: Box<dyn FnOnce(&mut State)> = Box::new(|state: &mut State| {
            state.dummy_state.push('🧉');
        });
        match state.frame_counter() {
            3 => Out::FutEvent(vec![Box::new(async move { Event::Test })]),
            5 => Out::FutFn(vec![
                Box::new(async move { serve_sencha }),
                Box::new(async move { serve_mate }),
            ]),
            x if x > 5 => {
                assert!(state.dummy_state.contains('🧉'));
                assert!(state.dummy_state.contains('🍵'));
                // emojis are 4 bytes wide
                assert_eq!(state.dummy_state.len(), 8, "{}", state.dummy_state);
                Out::Empty
            }
            _ => Out::Empty,
        }
    }

    fn on_tick(&mut self, _: &Context, state: &mut State) -> Out<State, Event> {
        state.tick();
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, state: &mut State, _: Event) -> Option<Event> {
        // the event is sent in frame 3
        assert!(state.frame_counter() >= 3);
        assert!(state.update_invocations() >= 3);
        None
    }
}

type FlowFuture = Pin<Box<dyn Future<Output = Box<dyn Flow<State, Event>>>>>;

fn element() -> FlowConstructor<State, Event> {
    Box::new(|_: InitContext| -> FlowFuture {
        Box::pin(async move { Box::new(Element) as Box<dyn Flow<_, _>> })
    })
}

fn idle() -> FlowConstructor<State, Event> {
    Box::new(|_: InitContext| -> FlowFuture {
        Box::pin(async move { Box::new(Idle) as Box<dyn Flow<_, _>> })
    })
}

#[test]
fn lifecycle_hooks_and_outputs_are_handled() {
    let settings = RunSettings {
        duration: Duration::from_secs(1),
        frame_time: FRAME,
        real_time: false,
        seed: 0,
    };
    let state = match flow_fractal::flow::run(vec![idle(), element()], settings) {
        Ok(state) => state,
        Err(e) => panic!("{}", e),
    };
    assert_eq!(state.init_invocations(), 1);
    assert_eq!(state.update_invocations(), 20);
    // configured to tick every 100 ms
    assert_eq!(state.tick_invocations(), 10);
    assert_eq!(state.dummy_state.len(), 8);
}

#[test]
fn zero_frame_time_is_rejected() {
    let settings = RunSettings {
        frame_time: Duration::ZERO,
        ..RunSettings::default()
    };
    assert!(flow_fractal::flow::run(vec![element()], settings).is_err());
}

#[test]
fn fractal_grows_inside_the_frame_loop() {
    let constructor = FractalFlow::constructor(config(3, 1.0), Assets::default()).unwrap();
    let settings = RunSettings {
        duration: Duration::from_secs(10),
        frame_time: FRAME,
        real_time: false,
        seed: 42,
    };
    let stats = flow_fractal::flow::run(vec![constructor], settings).unwrap();
    assert_eq!(stats.ticks, 10);
    assert_eq!(stats.nodes, 156);
    assert_eq!(stats.deepest, Some(3));
    assert_eq!(stats.pending_spawns, 0);
}

#[test]
fn regrow_starts_over_with_a_single_root() {
    let constructor = FractalFlow::constructor(config(2, 1.0), Assets::default()).unwrap();
    let mut app = App::new(vec![constructor], Context::new(5), FractalStats::default()).unwrap();
    assert_eq!(app.state().nodes, 1);

    for _ in 0..120 {
        app.step(FRAME);
    }
    assert_eq!(app.state().nodes, 31);
    assert_eq!(app.state().ticks, 6);

    app.send_event(FractalEvent::Regrow);
    app.step(FRAME);
    assert_eq!(app.state().nodes, 1);
    assert_eq!(app.state().deepest, Some(0));
    assert_eq!(app.state().pending_spawns, 1);
}

#[test]
fn invalid_config_is_rejected_before_the_app_starts() {
    let bad = FractalConfig {
        spawn_probability: 2.0,
        ..config(2, 1.0)
    };
    assert!(FractalFlow::constructor(bad, Assets::default()).is_err());
    assert!(FractalFlow::new(bad, Assets::default(), 0).is_err());
}

#[test]
fn constructed_flow_starts_with_a_planted_root() {
    let constructor = FractalFlow::constructor(config(2, 1.0), Assets::default()).unwrap();
    let app = App::new(vec![constructor], Context::new(11), FractalStats::default()).unwrap();
    let stats = app.state();
    assert_eq!(stats.nodes, 1);
    assert_eq!(stats.deepest, Some(0));
    assert_eq!(stats.pending_spawns, 1);
    assert_eq!(format!("{:?}", FractalEvent::Regrow), "Regrow");
}

#[test]
fn prune_removes_own_nodes_and_passes_on_foreign_ones() {
    let ctx = Context::default();
    let mut stats = FractalStats::default();
    let mut flow = FractalFlow::new(config(1, 1.0), Assets::default(), 3).unwrap();
    let _ = flow.on_init(&mut Context::default(), &mut stats);
    for _ in 0..100 {
        let _ = flow.on_update(&ctx, &mut stats, FRAME);
    }
    let fractal = flow.fractal().unwrap();
    assert_eq!(fractal.len(), 6);
    let child = fractal.node(fractal.root()).unwrap().children()[0];

    let unhandled = flow.on_custom_events(&ctx, &mut stats, FractalEvent::Prune(child));
    assert_eq!(unhandled, None);
    assert_eq!(stats.nodes, 5);
    assert!(!flow.graph().contains(child));

    let mut other = SceneGraph::new();
    let foreign = (0..10).map(|i| other.add_root(&i.to_string())).last().unwrap();
    let unhandled = flow.on_custom_events(&ctx, &mut stats, FractalEvent::Prune(foreign));
    assert_eq!(unhandled, Some(FractalEvent::Prune(foreign)));
    assert_eq!(stats.nodes, 5);
}
