//! Rigid-body physics core with GPU-accelerated mesh collision detection.
//!
//! The crate is split into three layers:
//!
//! - [`scene`]: an arena scene graph of transforms, meshes, and bodies.
//! - [`collision`]: pairwise mesh-vs-mesh triangle tests behind the
//!   [`collision::CollisionBackend`] seam, with a wgpu compute backend and
//!   a rayon CPU reference.
//! - [`simulation`]: force integration, contact resolution, and the
//!   dedicated physics thread that owns the scene and publishes world
//!   transforms to readers.
//!
//! A minimal session:
//!
//! ```no_run
//! use rigidsim::scene::{GameObject, Mesh, Scene};
//! use rigidsim::simulation::{PhysicsConfig, PhysicsRunner, RigidBody};
//!
//! let mut scene = Scene::new();
//! let mut object = GameObject::new("crate");
//! object.mesh = Some(Mesh::unit_cube());
//! let mut body = RigidBody::new();
//! body.initialize(object.mesh.as_ref(), 1.0, None);
//! object.body = Some(body);
//! scene.add_object(object);
//!
//! let runner = PhysicsRunner::spawn(scene, PhysicsConfig::default())?;
//! let share = runner.share();
//! // Render loop: read share.snapshot() each frame.
//! let scene = runner.shutdown();
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod collision;
pub mod scene;
pub mod simulation;
