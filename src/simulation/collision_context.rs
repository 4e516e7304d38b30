//! Result record of one pairwise collision test.

use glam::Vec4;

use crate::scene::NodeId;

/// Aggregated contacts from testing two bodies' meshes against each other.
///
/// Constructed fresh per pairwise test, consumed within the same physics
/// tick, never persisted. The vec4 layout mirrors the GPU output slots; the
/// w components are alignment padding except for the position slots coming
/// off the device, where w carried the source-mesh parity before decode.
#[derive(Debug, Clone, Default)]
pub struct CollisionContext {
    /// The body reported as the contact receiver, decided by which mesh
    /// contributed the colliding triangle.
    pub collidee: NodeId,
    /// One world-space contact position per detected contact.
    pub collision_positions: Vec<Vec4>,
    /// Contact normal paired with each position by index.
    pub collision_normals: Vec<Vec4>,
    /// The other body involved, per contact.
    pub collision_objects: Vec<NodeId>,
    /// Arithmetic mean of positions; NaN until `calculate_averages` runs,
    /// and NaN when there are zero contacts. Check
    /// `collision_positions.is_empty()` before use.
    pub average_position: Vec4,
    /// Arithmetic mean of normals, same caveats as `average_position`.
    pub average_normal: Vec4,
}

impl CollisionContext {
    pub fn new(collidee: NodeId) -> Self {
        Self {
            collidee,
            average_position: Vec4::splat(f32::NAN),
            average_normal: Vec4::splat(f32::NAN),
            ..Default::default()
        }
    }

    pub fn push_contact(&mut self, position: Vec4, normal: Vec4, other: NodeId) {
        self.collision_positions.push(position);
        self.collision_normals.push(normal);
        self.collision_objects.push(other);
    }

    /// Fills `average_position` and `average_normal` with the arithmetic
    /// mean over all contacts. With zero contacts both come out NaN.
    pub fn calculate_averages(&mut self) {
        let count = self.collision_positions.len() as f32;
        let position_sum: Vec4 = self.collision_positions.iter().copied().sum();
        let normal_sum: Vec4 = self.collision_normals.iter().copied().sum();
        self.average_position = position_sum / count;
        self.average_normal = normal_sum / count;
    }
}
