//! Double-buffered world-transform hand-off from the physics thread to
//! readers.
//!
//! The physics thread writes a full snapshot into the back slot after every
//! tick, then flips the front index with a release store. Readers load the
//! index with acquire and lock only the front slot, so a reader never
//! observes a half-written snapshot and the writer never waits on a reader
//! holding the other slot.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use glam::Mat4;

use crate::scene::{NodeId, Scene};

/// One node's world matrix as of the most recently published tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishedTransform {
    pub node: NodeId,
    pub world: Mat4,
}

/// Two-slot snapshot buffer flipped by the physics thread.
#[derive(Debug, Default)]
pub struct TransformShare {
    slots: [Mutex<Vec<PublishedTransform>>; 2],
    front: AtomicUsize,
}

impl TransformShare {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a complete snapshot of the scene's world transforms into the
    /// back slot and makes it the front.
    pub fn publish(&self, scene: &Scene) {
        let back = 1 - self.front.load(Ordering::Relaxed);
        {
            let mut slot = self
                .slots[back]
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slot.clear();
            for node in scene.traversal_order() {
                slot.push(PublishedTransform {
                    node,
                    world: scene.world_transform(node),
                });
            }
        }
        self.front.store(back, Ordering::Release);
    }

    /// Clones the most recently published snapshot.
    pub fn snapshot(&self) -> Vec<PublishedTransform> {
        let front = self.front.load(Ordering::Acquire);
        self.slots[front]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GameObject, Transform};
    use glam::Vec3;

    #[test]
    fn snapshot_starts_empty() {
        let share = TransformShare::new();
        assert!(share.snapshot().is_empty());
    }

    #[test]
    fn publish_exposes_world_matrices() {
        let mut scene = Scene::new();
        let root = scene.add_object(GameObject::new("root"));
        scene.node_mut(root).transform = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let child = scene.add_child(root, GameObject::new("child"));
        scene.node_mut(child).transform = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));

        let share = TransformShare::new();
        share.publish(&scene);

        let snapshot = share.snapshot();
        assert_eq!(snapshot.len(), 2);
        let child_entry = snapshot.iter().find(|t| t.node == child).unwrap();
        let position = child_entry.world.transform_point3(Vec3::ZERO);
        assert!((position - Vec3::new(1.0, 3.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn publish_flips_between_slots() {
        let mut scene = Scene::new();
        let id = scene.add_object(GameObject::new("mover"));

        let share = TransformShare::new();
        share.publish(&scene);
        let before = share.snapshot();

        scene.node_mut(id).transform.translate(Vec3::new(5.0, 0.0, 0.0));
        share.publish(&scene);
        let after = share.snapshot();

        assert_ne!(before[0].world, after[0].world);
        let position = after[0].world.transform_point3(Vec3::ZERO);
        assert!((position.x - 5.0).abs() < 1e-6);
    }
}
