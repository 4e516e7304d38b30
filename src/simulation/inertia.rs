//! Rotational-inertia models.
//!
//! The integrator only asks a model for a scalar moment about the rotation
//! axis, so a proper tensor model can be substituted later without touching
//! the integrator's control flow.

use glam::Vec3;

/// Scalar rotational inertia about the axis through the center of mass.
pub trait InertiaModel: Send + Sync {
    /// Moment of inertia for a force applied at `com_to_point` from the
    /// center of mass, for a body of the given mass.
    fn moment(&self, mass: f32, com_to_point: Vec3) -> f32;
}

/// Treats the whole body as a point mass at the application distance:
/// `I = m * |r|^2`.
///
/// TODO: derive a mesh-based inertia tensor from vertex distribution and
/// ship it as a second model.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointMass;

impl InertiaModel for PointMass {
    fn moment(&self, mass: f32, com_to_point: Vec3) -> f32 {
        mass * com_to_point.length_squared()
    }
}
