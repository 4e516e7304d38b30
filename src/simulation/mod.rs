//! Simulation layer: configuration, timing, rigid-body dynamics, and the
//! dedicated physics thread.

pub mod clock;
pub mod collision_context;
pub mod inertia;
pub mod physics_config;
pub mod rigid_body;
pub mod runner;
pub mod transform_share;

pub use clock::PhysicsClock;
pub use collision_context::CollisionContext;
pub use inertia::{InertiaModel, PointMass};
pub use physics_config::PhysicsConfig;
pub use rigid_body::RigidBody;
pub use runner::PhysicsRunner;
pub use transform_share::{PublishedTransform, TransformShare};
