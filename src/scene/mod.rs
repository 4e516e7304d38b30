//! Scene graph: an arena of game objects with parent/children links.
//!
//! The physics thread owns the scene outright while it runs; the render side
//! only ever sees world matrices published through
//! [`crate::simulation::transform_share::TransformShare`].

pub mod mesh;
pub mod transform;

pub use mesh::Mesh;
pub use transform::Transform;

use std::time::Instant;

use glam::Mat4;

use crate::collision::CollisionBackend;
use crate::simulation::inertia::InertiaModel;
use crate::simulation::physics_config::PhysicsConfig;
use crate::simulation::rigid_body::RigidBody;

/// Index of a game object in the scene arena.
pub type NodeId = usize;

/// A physical object in the scene: transform, optional mesh, optional body.
#[derive(Debug, Default)]
pub struct GameObject {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Object-to-parent transform.
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub body: Option<RigidBody>,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Arena-allocated scene graph.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<GameObject>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root-level game object and returns its id.
    pub fn add_object(&mut self, object: GameObject) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(object);
        self.roots.push(id);
        id
    }

    /// Adds a game object as a child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut object: GameObject) -> NodeId {
        let id = self.nodes.len();
        object.parent = Some(parent);
        self.nodes.push(object);
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &GameObject {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut GameObject {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Composition of all ancestor local transforms down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.nodes[id].transform.matrix;
        let mut current = self.nodes[id].parent;
        while let Some(parent) = current {
            matrix = self.nodes[parent].transform.matrix * matrix;
            current = self.nodes[parent].parent;
        }
        matrix
    }

    /// Depth-first traversal order over all nodes, children after their
    /// parent. Bodies are updated in this order every tick.
    pub fn traversal_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Ids of all nodes that can act as collision partners for `exclude`:
    /// initialized, collidable, mesh-bearing bodies other than the one being
    /// updated.
    pub fn collision_candidates(&self, exclude: NodeId) -> Vec<NodeId> {
        self.traversal_order()
            .into_iter()
            .filter(|&id| {
                id != exclude
                    && self.nodes[id].mesh.is_some()
                    && self.nodes[id]
                        .body
                        .as_ref()
                        .is_some_and(|body| body.is_initialized && body.is_collidable)
            })
            .collect()
    }

    /// Advances every rigid body by one physics tick, in traversal order.
    ///
    /// Each body is taken out of its node for the duration of its own update
    /// so the update can read the rest of the scene and apply reaction
    /// forces to other bodies.
    pub fn physics_update(
        &mut self,
        backend: &mut dyn CollisionBackend,
        config: &PhysicsConfig,
        inertia: &dyn InertiaModel,
        dt_seconds: f32,
        now: Instant,
    ) {
        for id in self.traversal_order() {
            let Some(mut body) = self.nodes[id].body.take() else {
                continue;
            };
            body.physics_update(id, self, backend, config, inertia, dt_seconds, now);
            self.nodes[id].body = Some(body);
        }
    }
}
