//! Rigid-body dynamics: force and torque accumulation, contact resolution,
//! and per-tick integration.
//!
//! Geometric edge cases (zero vectors, NaN rotation axes, degenerate
//! contacts) skip the affected sub-calculation and keep the tick going.
//! Nothing here returns an error or panics on bad geometry.

use std::time::{Duration, Instant};

use glam::{BVec3, Vec3};

use crate::collision::{CollisionBackend, ContactSource, MeshSnapshot};
use crate::scene::{Mesh, NodeId, Scene};

use super::collision_context::CollisionContext;
use super::inertia::InertiaModel;
use super::physics_config::PhysicsConfig;

/// Below this mass a body cannot be initialized.
const MIN_MASS: f32 = 1e-3;

/// Squared-length floor under which a vector counts as degenerate.
const DEGENERATE_SQ: f32 = 1e-12;

/// Hysteresis window used when a body is built without a config in hand.
const DEFAULT_COLLISION_THRESHOLD_MS: u64 = 50;

/// Dynamic state of one scene object.
///
/// A body does nothing until [`RigidBody::initialize`] succeeds; every other
/// operation is a no-op on an uninitialized body.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub mass: f32,
    /// Tangential counter-force scale at contact points.
    pub friction: f32,
    /// Restitution: penetration corrections are scaled by `1 + bounciness`.
    pub bounciness: f32,
    pub velocity: Vec3,
    /// Axis scaled by the rotation rate in radians per second.
    pub angular_velocity: Vec3,
    pub is_initialized: bool,
    pub is_collidable: bool,
    pub is_affected_by_gravity: bool,
    /// Locked translation axes are zeroed out of every velocity change.
    pub lock_translation: BVec3,
    /// Locked rotation axes, same contract as `lock_translation`.
    pub lock_rotation: BVec3,
    /// Overrides the mesh vertex average as the local center of mass.
    pub center_of_mass_override: Option<Vec3>,
    /// Debounced sustained-contact flag, see `update_collision_hysteresis`.
    pub is_colliding: bool,
    pub last_time_collided: Instant,
    /// Contacts must be continuously present (or absent) for this long
    /// before `is_colliding` flips.
    pub continuous_collision_threshold: Duration,
    contacts_present_since: Option<Instant>,
    contacts_absent_since: Option<Instant>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    pub fn new() -> Self {
        Self {
            mass: 0.0,
            friction: 1.0,
            bounciness: 0.0,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            is_initialized: false,
            is_collidable: true,
            is_affected_by_gravity: true,
            lock_translation: BVec3::FALSE,
            lock_rotation: BVec3::FALSE,
            center_of_mass_override: None,
            is_colliding: false,
            last_time_collided: Instant::now(),
            continuous_collision_threshold: Duration::from_millis(
                DEFAULT_COLLISION_THRESHOLD_MS,
            ),
            contacts_present_since: None,
            contacts_absent_since: None,
        }
    }

    /// A body whose hysteresis window comes from the simulation config.
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            continuous_collision_threshold: Duration::from_millis(
                config.continuous_collision_threshold_ms,
            ),
            ..Self::new()
        }
    }

    /// Marks the body ready for simulation.
    ///
    /// A missing or empty mesh, or a mass at or below `1e-3`, leaves the
    /// body uninitialized without reporting an error.
    pub fn initialize(&mut self, mesh: Option<&Mesh>, mass: f32, override_com: Option<Vec3>) {
        if mass <= MIN_MASS {
            log::debug!("rigid body rejected: mass {mass} below minimum");
            return;
        }
        let Some(mesh) = mesh else {
            log::debug!("rigid body rejected: no mesh");
            return;
        };
        if mesh.positions.is_empty() {
            log::debug!("rigid body rejected: mesh has no vertices");
            return;
        }

        self.mass = mass;
        self.center_of_mass_override = override_com;
        self.is_initialized = true;
    }

    /// Local-space center of mass: the override if one is set, otherwise the
    /// mesh vertex average recomputed from the current geometry. A body
    /// without a mesh or override centers on its own origin.
    pub fn center_of_mass(&self, mesh: Option<&Mesh>) -> Vec3 {
        match self.center_of_mass_override {
            Some(com) => com,
            None => mesh.map_or(Vec3::ZERO, |mesh| mesh.vertex_average()),
        }
    }

    /// Accumulates `force` into `velocity` over `dt` seconds.
    ///
    /// `ignore_mass` treats the force as an acceleration. Locked translation
    /// axes are zeroed out of the delta before it is applied.
    pub fn add_force(&mut self, force: Vec3, dt_seconds: f32, ignore_mass: bool) {
        if !self.is_initialized {
            return;
        }
        let mut delta = if ignore_mass {
            force * dt_seconds
        } else {
            force / self.mass * dt_seconds
        };
        if self.lock_translation.x {
            delta.x = 0.0;
        }
        if self.lock_translation.y {
            delta.y = 0.0;
        }
        if self.lock_translation.z {
            delta.z = 0.0;
        }
        self.velocity += delta;
    }

    /// Accumulates `torque` into `angular_velocity`, respecting rotation
    /// locks. Symmetric to [`RigidBody::add_force`].
    pub fn add_torque(&mut self, torque: Vec3, dt_seconds: f32, ignore_mass: bool) {
        if !self.is_initialized {
            return;
        }
        let mut delta = if ignore_mass {
            torque * dt_seconds
        } else {
            torque / self.mass * dt_seconds
        };
        if self.lock_rotation.x {
            delta.x = 0.0;
        }
        if self.lock_rotation.y {
            delta.y = 0.0;
        }
        if self.lock_rotation.z {
            delta.z = 0.0;
        }
        self.angular_velocity += delta;
    }

    /// Projection of `force` onto the line from the application point to the
    /// center of mass. A force applied exactly at the center of mass is
    /// transmitted whole.
    pub fn calculate_transmitted_force(com_to_point: Vec3, force: Vec3) -> Vec3 {
        if com_to_point.length_squared() < DEGENERATE_SQ {
            return force;
        }
        let dir = com_to_point.normalize();
        dir * force.dot(dir)
    }

    /// Applies a world-space force at a world-space point: the component
    /// aimed through the center of mass translates the body, the remainder
    /// spins it about `normalize(com_to_point × force)`.
    ///
    /// The rotational part is dropped when the application point coincides
    /// with the center of mass or the force is parallel to the lever arm.
    pub fn add_force_at_position(
        &mut self,
        force: Vec3,
        position: Vec3,
        world_center_of_mass: Vec3,
        dt_seconds: f32,
        inertia: &dyn InertiaModel,
    ) {
        if !self.is_initialized {
            return;
        }
        let com_to_point = position - world_center_of_mass;

        let transmitted = Self::calculate_transmitted_force(com_to_point, force);
        self.add_force(transmitted, dt_seconds, false);

        let lever = com_to_point.cross(force);
        if lever.length_squared() < DEGENERATE_SQ {
            return;
        }
        let axis = lever.normalize();
        if !axis.is_finite() {
            return;
        }
        let moment = inertia.moment(self.mass, com_to_point);
        if moment < DEGENERATE_SQ {
            return;
        }
        // The model already divides out the inertia, so the torque is
        // applied as a pure angular acceleration.
        self.add_torque(axis * (lever.length() / moment), dt_seconds, true);
    }

    /// Velocity of the body at a contact point offset `com_to_point` from
    /// the world center of mass: `v + ω × r`.
    pub fn point_velocity(&self, com_to_point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(com_to_point)
    }

    /// Debounces one-frame contact flicker: `is_colliding` flips only after
    /// contacts have been continuously present (or continuously absent) for
    /// the body's threshold window.
    pub fn update_collision_hysteresis(&mut self, any_contacts: bool, now: Instant) {
        if any_contacts {
            self.last_time_collided = now;
            self.contacts_absent_since = None;
            let since = *self.contacts_present_since.get_or_insert(now);
            if !self.is_colliding
                && now.duration_since(since) >= self.continuous_collision_threshold
            {
                self.is_colliding = true;
            }
        } else {
            self.contacts_present_since = None;
            let since = *self.contacts_absent_since.get_or_insert(now);
            if self.is_colliding
                && now.duration_since(since) >= self.continuous_collision_threshold
            {
                self.is_colliding = false;
            }
        }
    }

    fn is_fully_locked(&self) -> bool {
        self.lock_translation.all() && self.lock_rotation.all()
    }

    fn clamp_angular_speed(&mut self, max_speed: f32) {
        let speed = self.angular_velocity.length();
        if speed > max_speed {
            self.angular_velocity *= max_speed / speed;
        }
    }

    /// One physics tick for the body at arena index `id`.
    ///
    /// The body has been taken out of its node by the caller, so `scene`
    /// can be read and other bodies mutated without aliasing this one.
    #[allow(clippy::too_many_arguments)]
    pub fn physics_update(
        &mut self,
        id: NodeId,
        scene: &mut Scene,
        backend: &mut dyn CollisionBackend,
        config: &PhysicsConfig,
        inertia: &dyn InertiaModel,
        dt_seconds: f32,
        now: Instant,
    ) {
        if !self.is_initialized {
            return;
        }

        // 1. Skip conditions: fully constrained, or resting on a sustained
        //    contact below the speed floor.
        if self.is_fully_locked() {
            return;
        }
        if self.is_colliding && self.velocity.length() < config.resting_speed_floor {
            return;
        }

        // 2. Gravity and drag.
        if self.is_affected_by_gravity {
            self.add_force(config.gravity, dt_seconds, true);
        }
        let mass_sq = self.mass * self.mass;
        self.add_force(-self.velocity * config.linear_drag / mass_sq, dt_seconds, true);
        self.add_torque(
            -self.angular_velocity * config.angular_drag / mass_sq,
            dt_seconds,
            true,
        );

        let world = scene.world_transform(id);
        let world_com =
            world.transform_point3(self.center_of_mass(scene.node(id).mesh.as_ref()));

        // 3. Collision phase.
        let mut contexts = Vec::new();
        if self.is_collidable {
            contexts = self.collect_contacts(id, scene, backend, world);
            self.update_collision_hysteresis(!contexts.is_empty(), now);
        }

        // 4. Per-contact resolution.
        for context in &contexts {
            self.resolve_context(context, scene, config, inertia, world_com, dt_seconds);
        }

        // 5. Integration.
        let spin = self.angular_velocity.length();
        if spin > 1e-6 {
            scene.node_mut(id).transform.rotate_around_position(
                world_com,
                self.angular_velocity / spin,
                spin * dt_seconds,
            );
        }
        scene
            .node_mut(id)
            .transform
            .translate(self.velocity * dt_seconds);
    }

    /// Tests this body's mesh against every collision candidate and groups
    /// the resulting contacts into per-receiver contexts.
    fn collect_contacts(
        &self,
        id: NodeId,
        scene: &Scene,
        backend: &mut dyn CollisionBackend,
        world: glam::Mat4,
    ) -> Vec<CollisionContext> {
        let Some(own_mesh) = scene.node(id).mesh.as_ref() else {
            return Vec::new();
        };

        let mut contexts = Vec::new();
        for candidate in scene.collision_candidates(id) {
            let Some(other_mesh) = scene.node(candidate).mesh.as_ref() else {
                continue;
            };
            let hits = backend.test_pair(
                MeshSnapshot {
                    positions: &own_mesh.positions,
                    indices: &own_mesh.indices,
                    world,
                },
                MeshSnapshot {
                    positions: &other_mesh.positions,
                    indices: &other_mesh.indices,
                    world: scene.world_transform(candidate),
                },
            );
            if !hits.collided {
                continue;
            }

            // The hit-face parity decides which body receives each contact;
            // one pair can produce contacts for both receivers.
            let mut own_context = CollisionContext::new(id);
            let mut other_context = CollisionContext::new(candidate);
            for contact in &hits.contacts {
                let context = match contact.source {
                    ContactSource::MeshA => &mut own_context,
                    ContactSource::MeshB => &mut other_context,
                };
                context.push_contact(contact.position, contact.normal, candidate);
            }
            for mut context in [own_context, other_context] {
                if !context.collision_positions.is_empty() {
                    context.calculate_averages();
                    contexts.push(context);
                }
            }
        }
        contexts
    }

    /// Applies penetration correction and friction for every contact in one
    /// context. The equal-and-opposite correction lands on the partner body
    /// at the same world point.
    fn resolve_context(
        &mut self,
        context: &CollisionContext,
        scene: &mut Scene,
        config: &PhysicsConfig,
        inertia: &dyn InertiaModel,
        world_com: Vec3,
        dt_seconds: f32,
    ) {
        if dt_seconds <= f32::EPSILON {
            return;
        }
        for i in 0..context.collision_positions.len() {
            let contact_pos = context.collision_positions[i].truncate();
            let raw_normal = context.collision_normals[i].truncate().normalize_or_zero();
            if raw_normal == Vec3::ZERO {
                continue;
            }
            let com_to_point = contact_pos - world_com;
            let own_speed = self.point_velocity(com_to_point).length();

            let other_id = context.collision_objects[i];
            let other_world_com = {
                let other_world = scene.world_transform(other_id);
                let other_node = scene.node(other_id);
                match other_node.body.as_ref() {
                    Some(other) => other_world
                        .transform_point3(other.center_of_mass(other_node.mesh.as_ref())),
                    None => contact_pos,
                }
            };
            let other_speed = scene
                .node(other_id)
                .body
                .as_ref()
                .map(|other| other.point_velocity(contact_pos - other_world_com).length())
                .unwrap_or(0.0);

            // The faster body at the contact point does the resolving.
            if own_speed < other_speed {
                continue;
            }

            // Orient the face normal against this body's motion so the
            // correction pushes out of the contact.
            let point_vel = self.point_velocity(com_to_point);
            let normal = if point_vel.dot(raw_normal) > 0.0 {
                -raw_normal
            } else {
                raw_normal
            };

            for _ in 0..config.max_correction_iterations {
                let approach = self.point_velocity(com_to_point).dot(normal);
                if approach >= 0.0 {
                    break;
                }
                // Impulse-like: the force is scaled by 1/dt so one
                // sub-iteration cancels the full approach speed (times the
                // restitution factor) instead of one tick's worth of it.
                let correction = normal
                    * (approach.abs() * self.mass * (1.0 + self.bounciness) / dt_seconds);
                self.add_force_at_position(
                    correction,
                    contact_pos,
                    world_com,
                    dt_seconds,
                    inertia,
                );
                self.clamp_angular_speed(config.max_angular_speed);

                if let Some(other) = scene.node_mut(other_id).body.as_mut() {
                    other.add_force_at_position(
                        -correction,
                        contact_pos,
                        other_world_com,
                        dt_seconds,
                        inertia,
                    );
                    other.clamp_angular_speed(config.max_angular_speed);
                }
            }

            // Friction opposes the tangential slide at the contact.
            let point_vel = self.point_velocity(com_to_point);
            let tangential = point_vel - normal * point_vel.dot(normal);
            if tangential.length_squared() > DEGENERATE_SQ {
                let friction = -tangential.normalize() * (self.mass * self.friction);
                self.add_force_at_position(
                    friction,
                    contact_pos,
                    world_com,
                    dt_seconds,
                    inertia,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::cpu::CpuCollisionBackend;
    use crate::scene::{GameObject, Transform};
    use crate::simulation::inertia::PointMass;

    fn cube_body(mass: f32) -> RigidBody {
        let mesh = Mesh::unit_cube();
        let mut body = RigidBody::new();
        body.initialize(Some(&mesh), mass, None);
        body
    }

    #[test]
    fn force_scales_inversely_with_mass() {
        let mut light = cube_body(1.0);
        let mut heavy = cube_body(4.0);
        let force = Vec3::new(8.0, 0.0, 0.0);

        light.add_force(force, 0.5, false);
        heavy.add_force(force, 0.5, false);

        assert!((light.velocity.x - 4.0).abs() < 1e-6);
        assert!((heavy.velocity.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ignore_mass_applies_force_as_acceleration() {
        let mut body = cube_body(10.0);
        body.add_force(Vec3::new(0.0, -9.81, 0.0), 1.0, true);
        assert!((body.velocity.y + 9.81).abs() < 1e-6);
    }

    #[test]
    fn locked_translation_axes_stay_exactly_zero() {
        let mut body = cube_body(1.0);
        body.lock_translation.y = true;
        body.add_force(Vec3::new(1.0, 5.0, 2.0), 1.0, false);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.velocity.x > 0.0 && body.velocity.z > 0.0);
    }

    #[test]
    fn opposite_torques_cancel_exactly() {
        let mut body = cube_body(2.0);
        let torque = Vec3::new(0.3, -1.2, 0.7);
        body.add_torque(torque, 0.25, false);
        body.add_torque(-torque, 0.25, false);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn locked_rotation_axes_stay_exactly_zero() {
        let mut body = cube_body(1.0);
        body.lock_rotation.z = true;
        body.add_torque(Vec3::new(1.0, 1.0, 1.0), 1.0, false);
        assert_eq!(body.angular_velocity.z, 0.0);
        assert!(body.angular_velocity.x > 0.0);
    }

    #[test]
    fn initialize_rejects_bad_inputs() {
        let mesh = Mesh::unit_cube();

        let mut body = RigidBody::new();
        body.initialize(Some(&mesh), 1e-4, None);
        assert!(!body.is_initialized);

        body.initialize(None, 1.0, None);
        assert!(!body.is_initialized);

        let empty = Mesh::new(Vec::new(), Vec::new());
        body.initialize(Some(&empty), 1.0, None);
        assert!(!body.is_initialized);

        body.initialize(Some(&mesh), 1.0, None);
        assert!(body.is_initialized);
        assert!((body.center_of_mass(Some(&mesh)) - mesh.vertex_average()).length() < 1e-6);
    }

    #[test]
    fn center_of_mass_tracks_mesh_edits() {
        let mut mesh = Mesh::unit_cube();
        let mut body = RigidBody::new();
        body.initialize(Some(&mesh), 1.0, None);
        assert!(body.center_of_mass(Some(&mesh)).length() < 1e-6);

        // The vertex average is recomputed from the live geometry, not
        // frozen at initialization.
        for position in &mut mesh.positions {
            *position += Vec3::X;
        }
        assert!((body.center_of_mass(Some(&mesh)) - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn initialize_honors_center_of_mass_override() {
        let mesh = Mesh::unit_cube();
        let mut body = RigidBody::new();
        let com = Vec3::new(0.0, -0.5, 0.0);
        body.initialize(Some(&mesh), 2.0, Some(com));
        assert!(body.is_initialized);
        assert_eq!(body.center_of_mass(Some(&mesh)), com);
    }

    #[test]
    fn uninitialized_body_ignores_forces() {
        let mut body = RigidBody::new();
        body.add_force(Vec3::X, 1.0, true);
        body.add_torque(Vec3::Y, 1.0, true);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn force_at_center_of_mass_only_translates() {
        let mut body = cube_body(2.0);
        let world_com = Vec3::new(3.0, 1.0, -2.0);
        let force = Vec3::new(0.0, 4.0, 0.0);

        body.add_force_at_position(force, world_com, world_com, 0.5, &PointMass);

        assert!((body.velocity.y - 1.0).abs() < 1e-6);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn off_center_force_spins_about_the_lever_axis() {
        let mut body = cube_body(1.0);
        let world_com = Vec3::ZERO;
        // Force along +y at a point offset along +x: r x F points along +z,
        // the right-hand-rule spin.
        body.add_force_at_position(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            world_com,
            1.0,
            &PointMass,
        );
        assert!(body.angular_velocity.z > 0.0);
        assert!(body.angular_velocity.x.abs() < 1e-6);
        assert!(body.angular_velocity.y.abs() < 1e-6);
    }

    #[test]
    fn point_velocity_adds_the_spin_term() {
        let mut body = cube_body(1.0);
        body.velocity = Vec3::new(1.0, 0.0, 0.0);
        body.angular_velocity = Vec3::new(0.0, 0.0, 2.0);
        // omega x r for r = +x under +z spin points along +y.
        let pv = body.point_velocity(Vec3::X);
        assert!((pv - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn transmitted_force_is_the_projection_through_the_com() {
        // Force at 45 degrees to the lever: only the radial half transmits.
        let com_to_point = Vec3::new(1.0, 0.0, 0.0);
        let force = Vec3::new(3.0, 4.0, 0.0);
        let transmitted = RigidBody::calculate_transmitted_force(com_to_point, force);
        assert!((transmitted - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);

        // Degenerate lever: the whole force transmits.
        let whole = RigidBody::calculate_transmitted_force(Vec3::ZERO, force);
        assert_eq!(whole, force);
    }

    #[test]
    fn hysteresis_debounces_contact_onset() {
        let mut body = cube_body(1.0);
        body.continuous_collision_threshold = Duration::from_millis(50);
        let t0 = Instant::now();

        body.update_collision_hysteresis(true, t0);
        assert!(!body.is_colliding);

        // Still inside the window.
        body.update_collision_hysteresis(true, t0 + Duration::from_millis(20));
        assert!(!body.is_colliding);

        body.update_collision_hysteresis(true, t0 + Duration::from_millis(60));
        assert!(body.is_colliding);
    }

    #[test]
    fn hysteresis_debounces_contact_loss() {
        let mut body = cube_body(1.0);
        body.continuous_collision_threshold = Duration::from_millis(50);
        body.is_colliding = true;
        let t0 = Instant::now();

        body.update_collision_hysteresis(false, t0);
        assert!(body.is_colliding);

        // A contact inside the window resets the absence timer.
        body.update_collision_hysteresis(true, t0 + Duration::from_millis(30));
        body.update_collision_hysteresis(false, t0 + Duration::from_millis(40));
        body.update_collision_hysteresis(false, t0 + Duration::from_millis(80));
        assert!(body.is_colliding);

        body.update_collision_hysteresis(false, t0 + Duration::from_millis(95));
        assert!(!body.is_colliding);
    }

    #[test]
    fn fully_locked_body_does_not_integrate() {
        let mut scene = Scene::new();
        let mut object = GameObject::new("anchor");
        object.mesh = Some(Mesh::unit_cube());
        let mut body = cube_body(1.0);
        body.lock_translation = BVec3::TRUE;
        body.lock_rotation = BVec3::TRUE;
        object.body = Some(body);
        let id = scene.add_object(object);

        let config = PhysicsConfig::default();
        let mut backend = CpuCollisionBackend;
        scene.physics_update(&mut backend, &config, &PointMass, 0.1, Instant::now());

        assert_eq!(scene.node(id).transform.position(), Vec3::ZERO);
    }

    #[test]
    fn gravity_pulls_a_free_body_down() {
        let mut scene = Scene::new();
        let mut object = GameObject::new("faller");
        object.mesh = Some(Mesh::unit_cube());
        object.body = Some(cube_body(1.0));
        let id = scene.add_object(object);

        let config = PhysicsConfig::default();
        let mut backend = CpuCollisionBackend;
        let dt = 1.0 / 64.0;
        for _ in 0..8 {
            scene.physics_update(&mut backend, &config, &PointMass, dt, Instant::now());
        }

        let position = scene.node(id).transform.position();
        assert!(position.y < 0.0, "body never fell: {position}");
        let body = scene.node(id).body.as_ref().unwrap();
        assert!(body.velocity.y < 0.0);
    }

    #[test]
    fn head_on_correction_terminates_with_restitution() {
        // Single contact directly below the center of mass: the correction
        // transmits whole, so one sub-iteration reverses the approach by
        // the restitution factor and the loop exits.
        let mut body = cube_body(1.0);
        body.velocity = Vec3::new(0.0, -5.0, 0.0);
        body.bounciness = 0.5;
        body.friction = 0.0;

        let mut context = CollisionContext::new(0);
        context.push_contact(
            glam::Vec4::new(0.0, -0.5, 0.0, 0.0),
            glam::Vec4::new(0.0, -1.0, 0.0, 0.0),
            0,
        );

        let mut scene = Scene::new();
        scene.add_object(GameObject::new("other"));
        let config = PhysicsConfig::default();

        body.resolve_context(
            &context,
            &mut scene,
            &config,
            &PointMass,
            Vec3::ZERO,
            1.0 / 64.0,
        );

        // Delta v = |approach| * (1 + bounciness) = 7.5 along the oriented
        // normal, then the loop sees a receding point and stops.
        assert!((body.velocity.y - 2.5).abs() < 1e-4, "{}", body.velocity.y);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn penetration_correction_cancels_the_approach_in_one_tick() {
        let mut scene = Scene::new();

        // Anchored floor cube at the origin.
        let mut floor = GameObject::new("floor");
        floor.mesh = Some(Mesh::unit_cube());
        let mut floor_body = RigidBody::new();
        floor_body.initialize(floor.mesh.as_ref(), 1000.0, None);
        floor_body.lock_translation = BVec3::TRUE;
        floor_body.lock_rotation = BVec3::TRUE;
        floor_body.is_affected_by_gravity = false;
        floor.body = Some(floor_body);
        scene.add_object(floor);

        // Falling cube already overlapping the floor, approaching at 5 m/s.
        let mut faller = GameObject::new("faller");
        faller.mesh = Some(Mesh::unit_cube());
        faller.transform = Transform::from_translation(Vec3::new(0.0, 0.75, 0.0));
        let mut body = RigidBody::new();
        body.initialize(faller.mesh.as_ref(), 1.0, None);
        body.velocity = Vec3::new(0.0, -5.0, 0.0);
        body.friction = 0.0;
        faller.body = Some(body);
        let id = scene.add_object(faller);

        let config = PhysicsConfig::default();
        let mut backend = CpuCollisionBackend;
        scene.physics_update(&mut backend, &config, &PointMass, 1.0 / 64.0, Instant::now());

        // One tick of sub-iterations kills the bulk of the approach speed;
        // a wholly untouched body would still be at roughly -5.
        let body = scene.node(id).body.as_ref().unwrap();
        assert!(
            body.velocity.y > -2.0,
            "still approaching after correction: {}",
            body.velocity.y
        );
        assert!(
            body.angular_velocity.length() <= config.max_angular_speed + 1e-4,
            "angular clamp violated: {}",
            body.angular_velocity.length()
        );

        // The anchored floor absorbed nothing.
        let floor_body = scene.node(0).body.as_ref().unwrap();
        assert_eq!(floor_body.velocity, Vec3::ZERO);
        assert_eq!(floor_body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn resting_contact_freezes_a_slow_body() {
        let mut body = cube_body(1.0);
        body.is_colliding = true;
        body.velocity = Vec3::new(0.01, 0.0, 0.0);

        let mut scene = Scene::new();
        let mut object = GameObject::new("rester");
        object.mesh = Some(Mesh::unit_cube());
        let id = scene.add_object(object);

        let config = PhysicsConfig::default();
        let mut backend = CpuCollisionBackend;
        body.physics_update(
            id,
            &mut scene,
            &mut backend,
            &config,
            &PointMass,
            0.1,
            Instant::now(),
        );

        // No gravity, no drag, no integration.
        assert_eq!(body.velocity, Vec3::new(0.01, 0.0, 0.0));
        assert_eq!(scene.node(id).transform.position(), Vec3::ZERO);
    }
}
