//! Scene graph and hierarchical scene organization.
//!
//! Nodes live in a generational arena and are addressed through [`NodeId`]s.
//! Every node carries a local transform relative to its parent; world
//! transforms are derived top-down by [`SceneGraph::update_world_transforms`].
//! Removing a node removes its entire subtree, and ids of removed nodes never
//! resolve again, even after their slot was reused.

use log::warn;

use crate::data_structures::{instance::Instance, material::Renderable};

/// Handle to a node of a [`SceneGraph`].
///
/// The generation guards against stale handles: once a node is removed its id
/// stays dead even if the arena slot gets recycled for a new node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("scene node {0:?} does not exist")]
    UnknownNode(NodeId),
}

#[derive(Debug)]
pub struct Node {
    name: String,
    local: Instance,
    world: Instance,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    renderable: Option<Renderable>,
}

impl Node {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            local: Instance::default(),
            world: Instance::default(),
            parent,
            children: Vec::new(),
            renderable: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local(&self) -> &Instance {
        &self.local
    }

    /// World transform as of the last [`SceneGraph::update_world_transforms`].
    pub fn world(&self) -> &Instance {
        &self.world
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn renderable(&self) -> Option<&Renderable> {
        self.renderable.as_ref()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
    len: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    fn insert(&mut self, node: Node) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Adds a node without a parent. Its local transform is its world transform.
    pub fn add_root(&mut self, name: &str) -> NodeId {
        let id = self.insert(Node::new(name, None));
        self.roots.push(id);
        id
    }

    /// Creates a new node with identity local transform below `parent`.
    pub fn attach_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = self.insert(Node::new(name, Some(parent)));
        let parent_world = {
            let parent = self.node_mut(parent)?;
            parent.children.push(id);
            parent.world.clone()
        };
        // keep the world transform meaningful until the next full update
        self.node_mut(id)?.world = parent_world;
        Ok(id)
    }

    pub fn local_transform(&self, id: NodeId) -> Option<&Instance> {
        self.get(id).map(Node::local)
    }

    pub fn world_transform(&self, id: NodeId) -> Option<&Instance> {
        self.get(id).map(Node::world)
    }

    pub fn set_local_transform(&mut self, id: NodeId, instance: Instance) -> Result<(), SceneError> {
        self.node_mut(id)?.local = instance;
        Ok(())
    }

    /// Mutates the local transform of `id` in place.
    pub fn local_transform_mut(
        &mut self,
        id: NodeId,
        mutation: impl FnOnce(&mut Instance),
    ) -> Result<(), SceneError> {
        mutation(&mut self.node_mut(id)?.local);
        Ok(())
    }

    pub fn set_renderable(&mut self, id: NodeId, renderable: Renderable) -> Result<(), SceneError> {
        self.node_mut(id)?.renderable = Some(renderable);
        Ok(())
    }

    pub fn renderable(&self, id: NodeId) -> Option<&Renderable> {
        self.get(id).and_then(Node::renderable)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Children of `id` in attachment order. Empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Node::name)
    }

    /// Pre-order traversal of the subtree rooted at `root` (including `root`).
    pub fn depth_first(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                warn!("Skipping dangling scene node {:?} during traversal.", id);
                continue;
            };
            order.push(id);
            // reversed so the first child is visited first
            stack.extend(node.children.iter().rev());
        }
        order
    }

    /// Recomputes `world = parent_world * local` for every node, starting at the roots.
    pub fn update_world_transforms(&mut self) {
        let mut stack: Vec<(NodeId, Instance)> = self
            .roots
            .iter()
            .map(|&root| (root, Instance::default()))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                warn!(
                    "You tried to transform node {:?}, which is no longer part of the scene.",
                    id
                );
                continue;
            };
            let world = &parent_world * &node.local;
            node.world = world.clone();
            stack.extend(node.children.iter().map(|&child| (child, world.clone())));
        }
    }

    /// Removes `id` together with all of its descendants.
    ///
    /// Returns the removed ids (pre-order, `id` first) so that owners of
    /// per-node state can drop it as well.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let parent = self.get(id).ok_or(SceneError::UnknownNode(id))?.parent;
        match parent.and_then(|parent| self.get_mut(parent)) {
            Some(parent) => parent.children.retain(|&child| child != id),
            None => self.roots.retain(|&root| root != id),
        }
        let removed = self.depth_first(id);
        for &dead in &removed {
            let slot = &mut self.slots[dead.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(dead.index);
            self.len -= 1;
        }
        Ok(removed)
    }
}
