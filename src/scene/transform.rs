//! Column-major 4x4 transform for scene-graph nodes.
//!
//! Coordinate system is X right, Y up, Z forward. Scale is not tracked
//! separately; physics meshes are expected to be unit-scale.

use glam::{Mat4, Quat, Vec3};

/// Object-to-parent transform backed by a homogeneous matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The homogeneous transformation matrix.
    pub matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(translation),
        }
    }

    /// Translation part of the matrix (first three components of the fourth
    /// column).
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.matrix.w_axis = position.extend(1.0);
    }

    /// Offsets the fourth column of the matrix.
    pub fn translate(&mut self, offset: Vec3) {
        self.matrix.w_axis += offset.extend(0.0);
    }

    /// Rotates the transform about its own origin.
    pub fn rotate(&mut self, axis: Vec3, angle_radians: f32) {
        if axis.length_squared() < 1e-12 || !angle_radians.is_finite() {
            return;
        }
        let rotation = Mat4::from_quat(Quat::from_axis_angle(axis.normalize(), angle_radians));
        let position = self.position();
        self.set_position(Vec3::ZERO);
        self.matrix = rotation * self.matrix;
        self.set_position(position);
    }

    /// Rotates the transform by `angle_radians` around an axis through
    /// `pivot`. The pivot is expressed in the same space as this transform
    /// (parent space for a scene-graph node).
    pub fn rotate_around_position(&mut self, pivot: Vec3, axis: Vec3, angle_radians: f32) {
        if axis.length_squared() < 1e-12 || !angle_radians.is_finite() {
            return;
        }
        let rotation = Mat4::from_quat(Quat::from_axis_angle(axis.normalize(), angle_radians));
        self.matrix =
            Mat4::from_translation(pivot) * rotation * Mat4::from_translation(-pivot) * self.matrix;
    }

    /// World X axis rotated by this transform.
    pub fn right(&self) -> Vec3 {
        self.matrix.x_axis.truncate().normalize()
    }

    /// World Y axis rotated by this transform.
    pub fn up(&self) -> Vec3 {
        self.matrix.y_axis.truncate().normalize()
    }

    /// World Z axis rotated by this transform.
    pub fn forward(&self) -> Vec3 {
        self.matrix.z_axis.truncate().normalize()
    }
}
