//! A fractal that grows itself inside a [`SceneGraph`].
//!
//! The root node picks a spin, a twist, a mesh and a depth-dependent material
//! and then, one direction at a time, decides whether to spawn a smaller copy
//! of itself on that side. Every copy repeats the procedure until
//! `max_depth` is reached. Spawns are staggered by a random delay, which is
//! modelled as a continuation in a tick-driven [`Scheduler`]: a node waiting
//! for its next child costs nothing but an entry in the queue, and all nodes
//! keep spinning while their siblings are still growing.
//!
//! ```text
//!            up
//!            |
//!   left -- node -- right      (forward/back point out of the page)
//! ```

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use cgmath::{Deg, Euler, Vector3};
use instant::Duration;
use log::{debug, info, trace, warn};

use crate::{
    data_structures::{
        instance::Instance,
        material::{Material, MeshHandle, Renderable},
        scene_graph::{NodeId, SceneError, SceneGraph},
    },
    fractal::{
        config::FractalConfig,
        gradient::{MaterialGradient, VARIANTS},
        random::RandomSource,
        schedule::Scheduler,
    },
    resources::Assets,
};

pub mod config;
pub mod flow;
pub mod gradient;
pub mod random;
pub mod schedule;

/// Number of directions a node may grow children in.
pub const CHILD_COUNT: usize = 5;

/// Bounds (seconds) of the random pause before each spawned child.
pub const MIN_SPAWN_DELAY: f32 = 0.1;
pub const MAX_SPAWN_DELAY: f32 = 0.5;

pub const ROOT_NAME: &str = "Fractal";
pub const CHILD_NAME: &str = "Fractal Child";

// up, right, left, forward, back
const CHILD_DIRECTIONS: [[f32; 3]; CHILD_COUNT] = [
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

// Euler angles in degrees that turn a child's up axis away from its parent
const CHILD_ORIENTATIONS: [[f32; 3]; CHILD_COUNT] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, -90.0],
    [0.0, 0.0, 90.0],
    [90.0, 0.0, 0.0],
    [-90.0, 0.0, 0.0],
];

/// Trees above this size get a warning, they are rarely intended.
const LARGE_TREE: u64 = 100_000;

pub fn child_direction(index: usize) -> Vector3<f32> {
    CHILD_DIRECTIONS[index].into()
}

pub fn child_orientation(index: usize) -> cgmath::Quaternion<f32> {
    let [x, y, z] = CHILD_ORIENTATIONS[index];
    Euler::new(Deg(x), Deg(y), Deg(z)).into()
}

/// Local transform of the child grown towards `index`.
///
/// The child sits flush on the parent's face: half a parent unit plus half
/// of the child's own (scaled) size away from the parent's centre.
pub fn child_placement(index: usize, child_scale: f32) -> Instance {
    Instance::placed(
        child_direction(index) * (0.5 + 0.5 * child_scale),
        child_orientation(index),
        child_scale,
    )
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FractalError {
    #[error("invalid fractal configuration: {0}")]
    InvalidConfig(String),
    #[error("a fractal needs at least one mesh")]
    NoMeshes,
    #[error("no material for depth {depth}, variant {variant}")]
    MissingMaterial { depth: u32, variant: usize },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Still walking through its directions, possibly waiting for a delay.
    Spawning,
    /// Done spawning; only spins from now on.
    Idle,
}

/// A suspended spawn: once due, `parent` grows a child towards `direction`
/// and then continues with its remaining directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSpawn {
    pub parent: NodeId,
    pub direction: usize,
}

#[derive(Debug)]
pub struct FractalNode {
    depth: u32,
    config: FractalConfig,
    rotation_speed: f32,
    mesh: MeshHandle,
    variant: usize,
    material: Arc<Material>,
    parent: Option<NodeId>,
    child_index: Option<usize>,
    children: Vec<NodeId>,
    next_direction: usize,
    state: NodeState,
}

impl FractalNode {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn config(&self) -> &FractalConfig {
        &self.config
    }

    /// Spin around the local up axis in degrees per second.
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn mesh(&self) -> &MeshHandle {
        &self.mesh
    }

    pub fn variant(&self) -> usize {
        self.variant
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direction this node was grown towards; `None` for the root.
    pub fn child_index(&self) -> Option<usize> {
        self.child_index
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn state(&self) -> NodeState {
        self.state
    }
}

/// Where a new node is attached and which configuration it inherits.
struct Placement {
    id: NodeId,
    depth: u32,
    config: FractalConfig,
    parent: Option<(NodeId, usize)>,
}

#[derive(Debug)]
pub struct Fractal {
    root: NodeId,
    config: FractalConfig,
    meshes: Arc<[MeshHandle]>,
    materials: Arc<MaterialGradient>,
    nodes: HashMap<NodeId, FractalNode>,
    pending: Scheduler<PendingSpawn>,
    elapsed: Duration,
}

impl Fractal {
    /// Creates the root node (below `parent` if given) and starts growing.
    ///
    /// Fails if `config` is out of range. Nothing is added to `graph` in that case.
    pub fn new<R: RandomSource + ?Sized>(
        graph: &mut SceneGraph,
        parent: Option<NodeId>,
        config: FractalConfig,
        assets: &Assets,
        rng: &mut R,
    ) -> Result<Self, FractalError> {
        config.validate()?;
        let max_nodes = config.max_node_count();
        info!(
            "Growing fractal with max depth {} (up to {} nodes).",
            config.max_depth, max_nodes
        );
        if max_nodes > LARGE_TREE {
            warn!(
                "A fully grown fractal of depth {} has {} nodes, consider a lower max_depth.",
                config.max_depth, max_nodes
            );
        }
        let root = match parent {
            Some(parent) => graph.attach_child(parent, ROOT_NAME)?,
            None => graph.add_root(ROOT_NAME),
        };
        let mut fractal = Self {
            root,
            config,
            meshes: assets.meshes().clone(),
            materials: Arc::new(MaterialGradient::build(assets.material(), config.max_depth)),
            nodes: HashMap::new(),
            pending: Scheduler::new(),
            elapsed: Duration::ZERO,
        };
        let placement = Placement {
            id: root,
            depth: 0,
            config,
            parent: None,
        };
        if let Err(e) = fractal.start_node(graph, placement, rng) {
            // don't leave a half configured root behind
            let _ = graph.remove(root);
            return Err(e);
        }
        Ok(fractal)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &FractalConfig {
        &self.config
    }

    pub fn materials(&self) -> &Arc<MaterialGradient> {
        &self.materials
    }

    pub fn node(&self, id: NodeId) -> Option<&FractalNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &FractalNode)> {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest level that currently has a node.
    pub fn deepest(&self) -> Option<u32> {
        self.nodes.values().map(FractalNode::depth).max()
    }

    /// Number of children that are waiting for their delay to pass.
    pub fn pending_spawns(&self) -> usize {
        self.pending.len()
    }

    /// Whether any node will still spawn a child.
    pub fn is_growing(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Time this fractal has been updated for.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advances the fractal by `dt`: spins every node, then spawns the
    /// children whose delay has passed. Children born here start spinning
    /// on the next update.
    ///
    /// Nodes whose scene node was removed directly through the graph are
    /// forgotten here, together with their pending spawns.
    pub fn update<R: RandomSource + ?Sized>(
        &mut self,
        graph: &mut SceneGraph,
        rng: &mut R,
        dt: Duration,
    ) {
        self.elapsed += dt;
        let seconds = dt.as_secs_f32();
        let mut lost = Vec::new();
        for (&id, node) in &self.nodes {
            let angle = Deg(node.rotation_speed * seconds);
            if graph
                .local_transform_mut(id, |local| local.rotate_local(Vector3::unit_y(), angle))
                .is_err()
            {
                lost.push(id);
            }
        }
        if !lost.is_empty() {
            let forgotten = self.forget(lost);
            warn!(
                "{} fractal node(s) were removed from the scene without the fractal, they will not grow any further.",
                forgotten.len()
            );
        }
        for PendingSpawn { parent, direction } in self.pending.drain_due(self.elapsed) {
            if !self.nodes.contains_key(&parent) {
                continue;
            }
            if let Err(e) = self.spawn_child(graph, parent, direction, rng) {
                warn!(
                    "Could not grow child {} of fractal node {:?}: {}",
                    direction, parent, e
                );
            }
            self.continue_spawning(parent, rng);
        }
    }

    /// Removes `id` and everything below it from the scene and cancels the
    /// spawns they were still waiting for. Returns the number of removed scene nodes.
    pub fn destroy(&mut self, graph: &mut SceneGraph, id: NodeId) -> Result<usize, FractalError> {
        let removed = graph.remove(id)?;
        let count = removed.len();
        self.forget(removed);
        debug!(
            "Destroyed fractal subtree at {:?} ({} scene nodes), {} nodes left.",
            id,
            count,
            self.nodes.len()
        );
        Ok(count)
    }

    /// Drops `ids` and all their fractal descendants, unlinks them from
    /// surviving parents and cancels their pending spawns.
    fn forget(&mut self, ids: impl IntoIterator<Item = NodeId>) -> HashSet<NodeId> {
        let mut stack: Vec<NodeId> = ids.into_iter().collect();
        let mut gone = HashSet::new();
        while let Some(id) = stack.pop() {
            if !gone.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().copied());
            }
        }
        for id in &gone {
            let parent = self
                .nodes
                .get(id)
                .and_then(FractalNode::parent)
                .filter(|parent| !gone.contains(parent));
            if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
                parent.children.retain(|child| child != id);
            }
        }
        self.nodes.retain(|id, _| !gone.contains(id));
        self.pending.retain(|task| !gone.contains(&task.parent));
        gone
    }

    /// Removes the whole tree from `graph`.
    pub fn destroy_all(mut self, graph: &mut SceneGraph) -> Result<usize, FractalError> {
        let root = self.root;
        self.destroy(graph, root)
    }

    fn spawn_child<R: RandomSource + ?Sized>(
        &mut self,
        graph: &mut SceneGraph,
        parent: NodeId,
        direction: usize,
        rng: &mut R,
    ) -> Result<NodeId, FractalError> {
        let (depth, config) = match self.nodes.get(&parent) {
            Some(node) => (node.depth + 1, node.config),
            None => return Err(SceneError::UnknownNode(parent).into()),
        };
        let id = graph.attach_child(parent, CHILD_NAME)?;
        // placement has to happen before the node configures itself
        graph.set_local_transform(id, child_placement(direction, config.child_scale))?;
        let placement = Placement {
            id,
            depth,
            config,
            parent: Some((parent, direction)),
        };
        if let Err(e) = self.start_node(graph, placement, rng) {
            let _ = graph.remove(id);
            return Err(e);
        }
        trace!(
            "Spawned {:?} at depth {} towards direction {} of {:?}.",
            id, depth, direction, parent
        );
        Ok(id)
    }

    /// Picks spin, twist, mesh and material for a freshly attached node and
    /// starts its spawn sequence.
    fn start_node<R: RandomSource + ?Sized>(
        &mut self,
        graph: &mut SceneGraph,
        placement: Placement,
        rng: &mut R,
    ) -> Result<(), FractalError> {
        let Placement {
            id,
            depth,
            config,
            parent,
        } = placement;
        let rotation_speed = rng.range(-config.max_rotation_speed, config.max_rotation_speed);
        let twist = rng.range(-config.max_twist, config.max_twist);
        graph.local_transform_mut(id, |local| {
            local.rotate_local(Vector3::unit_x(), Deg(twist))
        })?;

        let mesh = self.meshes[rng.index(self.meshes.len())].clone();
        let variant = rng.index(VARIANTS);
        let material = self
            .materials
            .get(depth, variant)
            .cloned()
            .ok_or(FractalError::MissingMaterial { depth, variant })?;
        graph.set_renderable(
            id,
            Renderable {
                mesh: mesh.clone(),
                material: material.clone(),
            },
        )?;
        debug!(
            "Configured {:?}: depth {}, mesh {}, variant {}, spin {:.1}°/s, twist {:.1}°.",
            id, depth, mesh.name, variant, rotation_speed, twist
        );

        let state = if depth < config.max_depth {
            NodeState::Spawning
        } else {
            NodeState::Idle
        };
        self.nodes.insert(
            id,
            FractalNode {
                depth,
                config,
                rotation_speed,
                mesh,
                variant,
                material,
                parent: parent.map(|(parent, _)| parent),
                child_index: parent.map(|(_, direction)| direction),
                children: Vec::new(),
                next_direction: 0,
                state,
            },
        );
        if let Some(parent) = parent.and_then(|(parent, _)| self.nodes.get_mut(&parent)) {
            parent.children.push(id);
        }
        if state == NodeState::Spawning {
            self.continue_spawning(id, rng);
        }
        Ok(())
    }

    /// Walks the remaining directions of `id` until one passes the spawn
    /// check, which suspends the sequence for a random delay.
    fn continue_spawning<R: RandomSource + ?Sized>(&mut self, id: NodeId, rng: &mut R) {
        let now = self.elapsed;
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if node.depth >= node.config.max_depth {
            node.state = NodeState::Idle;
            return;
        }
        while node.next_direction < CHILD_COUNT {
            let direction = node.next_direction;
            node.next_direction += 1;
            if rng.unit() < node.config.spawn_probability {
                let delay = rng.range(MIN_SPAWN_DELAY, MAX_SPAWN_DELAY);
                self.pending.schedule_at(
                    now + Duration::from_secs_f32(delay),
                    PendingSpawn {
                        parent: id,
                        direction,
                    },
                );
                return;
            }
        }
        node.state = NodeState::Idle;
    }
}
