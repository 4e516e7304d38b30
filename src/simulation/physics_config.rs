use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Physics configuration shared by every rigid body in a scene.
///
/// Gravity and the drag coefficients live here instead of process-wide
/// globals so scenes and tests can override them independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Fixed timestep target (64 Hz). The physics loop is free-running and
    /// does not throttle to this; it is the step the tuning below assumes.
    pub fixed_timestep: f32,

    /// Gravity acceleration applied to bodies with gravity enabled.
    pub gravity: Vec3,

    /// Linear air-resistance coefficient. Drag force is
    /// `-velocity * linear_drag / mass^2`, an ad-hoc model rather than a
    /// physically derived one.
    pub linear_drag: f32,

    /// Angular drag coefficient, the rotational analog of `linear_drag`.
    pub angular_drag: f32,

    /// Speed floor below which a colliding body is treated as resting and
    /// skips integration entirely (units per second).
    pub resting_speed_floor: f32,

    /// Maximum penetration-correction sub-iterations per contact.
    pub max_correction_iterations: u32,

    /// Angular speed clamp applied after each correction (rad/s).
    pub max_angular_speed: f32,

    /// Sustained-contact duration before `is_colliding` flips, in
    /// milliseconds. Debounces one-frame contact flicker in both directions.
    pub continuous_collision_threshold_ms: u64,

    /// Maximum time the physics thread blocks on a collision dispatch before
    /// the test is abandoned, in seconds.
    pub fence_timeout_secs: u64,

    /// Measured delta-time clamp (seconds). A long device stall otherwise
    /// feeds a multi-second step into the integrator on the next tick.
    pub max_delta_time: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 64.0, // 64 Hz
            gravity: Vec3::new(0.0, -9.81, 0.0),
            linear_drag: 1.0,
            angular_drag: 1.0,
            resting_speed_floor: 0.1,
            max_correction_iterations: 20,
            max_angular_speed: 5.0,
            continuous_collision_threshold_ms: 50,
            fence_timeout_secs: 30,
            max_delta_time: 0.25,
        }
    }
}
