//! Hosting a [`Fractal`] inside the app's frame loop.

use std::pin::Pin;

use instant::Duration;
use log::{error, info};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    context::{Context, InitContext},
    data_structures::scene_graph::{NodeId, SceneGraph},
    flow::{Flow, FlowConstructor, Out},
    fractal::{Fractal, FractalError, config::FractalConfig},
    resources::Assets,
};

type FlowFuture = Pin<Box<dyn Future<Output = Box<dyn Flow<FractalStats, FractalEvent>>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractalEvent {
    /// Removes the node and its subtree.
    Prune(NodeId),
    /// Throws the whole tree away and grows a new one from scratch.
    Regrow,
}

/// Snapshot of the hosted fractal, refreshed on every tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FractalStats {
    pub nodes: usize,
    pub deepest: Option<u32>,
    pub pending_spawns: usize,
    pub ticks: u64,
}

impl FractalStats {
    fn observe(&mut self, fractal: Option<&Fractal>) {
        self.nodes = fractal.map_or(0, Fractal::len);
        self.deepest = fractal.and_then(Fractal::deepest);
        self.pending_spawns = fractal.map_or(0, Fractal::pending_spawns);
    }
}

/// Owns the scene graph a fractal grows in, plus the random source driving it.
pub struct FractalFlow {
    graph: SceneGraph,
    fractal: Option<Fractal>,
    config: FractalConfig,
    assets: Assets,
    rng: StdRng,
}

impl FractalFlow {
    pub fn new(config: FractalConfig, assets: Assets, seed: u64) -> Result<Self, FractalError> {
        let mut flow = Self::unplanted(config, assets, seed);
        let fractal = Fractal::new(&mut flow.graph, None, config, &flow.assets, &mut flow.rng)?;
        flow.fractal = Some(fractal);
        Ok(flow)
    }

    /// Validates `config` up front and returns a constructor for [`crate::flow::App`].
    ///
    /// The flow is seeded from the [`InitContext`] and grows its tree the
    /// same way a [`FractalEvent::Regrow`] does: should growing fail, the
    /// error is logged and the flow runs without a tree until the next regrow.
    pub fn constructor(
        config: FractalConfig,
        assets: Assets,
    ) -> Result<FlowConstructor<FractalStats, FractalEvent>, FractalError> {
        config.validate()?;
        Ok(Box::new(move |init: InitContext| -> FlowFuture {
            Box::pin(async move {
                let mut flow = FractalFlow::unplanted(config, assets, init.seed);
                flow.regrow();
                Box::new(flow) as Box<dyn Flow<FractalStats, FractalEvent>>
            })
        }))
    }

    fn unplanted(config: FractalConfig, assets: Assets, seed: u64) -> Self {
        Self {
            graph: SceneGraph::new(),
            fractal: None,
            config,
            assets,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn fractal(&self) -> Option<&Fractal> {
        self.fractal.as_ref()
    }

    fn regrow(&mut self) {
        if let Some(old) = self.fractal.take() {
            if let Err(e) = old.destroy_all(&mut self.graph) {
                error!("Old fractal could not be removed: {}", e);
            }
        }
        match Fractal::new(
            &mut self.graph,
            None,
            self.config,
            &self.assets,
            &mut self.rng,
        ) {
            Ok(fractal) => self.fractal = Some(fractal),
            Err(e) => error!("Fractal could not be regrown: {}", e),
        }
    }
}

impl Flow<FractalStats, FractalEvent> for FractalFlow {
    fn on_init(
        &mut self,
        _: &mut Context,
        state: &mut FractalStats,
    ) -> Out<FractalStats, FractalEvent> {
        state.observe(self.fractal.as_ref());
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        _: &mut FractalStats,
        dt: Duration,
    ) -> Out<FractalStats, FractalEvent> {
        if let Some(fractal) = self.fractal.as_mut() {
            fractal.update(&mut self.graph, &mut self.rng, dt);
            self.graph.update_world_transforms();
        }
        Out::Empty
    }

    fn on_tick(&mut self, ctx: &Context, state: &mut FractalStats) -> Out<FractalStats, FractalEvent> {
        state.ticks += 1;
        state.observe(self.fractal.as_ref());
        info!(
            "t={:.1}s: {} nodes, deepest level {:?}, {} spawns pending",
            ctx.elapsed().as_secs_f32(),
            state.nodes,
            state.deepest,
            state.pending_spawns
        );
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        state: &mut FractalStats,
        event: FractalEvent,
    ) -> Option<FractalEvent> {
        match event {
            FractalEvent::Prune(id) => {
                // not ours, let the next flow have a go
                let Some(fractal) = self.fractal.as_mut().filter(|f| f.node(id).is_some()) else {
                    return Some(FractalEvent::Prune(id));
                };
                if let Err(e) = fractal.destroy(&mut self.graph, id) {
                    error!("Could not prune {:?}: {}", id, e);
                }
            }
            FractalEvent::Regrow => self.regrow(),
        }
        state.observe(self.fractal.as_ref());
        None
    }
}
