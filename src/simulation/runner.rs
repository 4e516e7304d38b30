//! The dedicated physics thread.
//!
//! [`PhysicsRunner::spawn`] moves the scene onto a named thread that owns it
//! for the runner's whole lifetime. The thread creates its own collision
//! device context at startup (separate from any render context), free-runs
//! the tick loop, and publishes world transforms through a
//! [`TransformShare`] after every tick. [`PhysicsRunner::shutdown`] stops
//! the loop and hands the scene back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::collision::cpu::CpuCollisionBackend;
use crate::collision::gpu::{GpuCollisionDetector, GpuContext};
use crate::collision::CollisionBackend;
use crate::scene::Scene;

use super::clock::PhysicsClock;
use super::inertia::PointMass;
use super::physics_config::PhysicsConfig;
use super::transform_share::TransformShare;

/// Handle to the running physics thread.
pub struct PhysicsRunner {
    handle: Option<JoinHandle<Scene>>,
    shutdown: Arc<AtomicBool>,
    share: Arc<TransformShare>,
}

impl PhysicsRunner {
    /// Starts the physics thread and moves `scene` onto it.
    ///
    /// If no compute adapter is available the thread falls back to the CPU
    /// reference backend and keeps simulating.
    pub fn spawn(mut scene: Scene, config: PhysicsConfig) -> std::io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let share = Arc::new(TransformShare::new());

        let thread_shutdown = Arc::clone(&shutdown);
        let thread_share = Arc::clone(&share);

        let handle = thread::Builder::new()
            .name("physics".to_string())
            .spawn(move || {
                let mut backend: Box<dyn CollisionBackend> = match GpuContext::new() {
                    Ok(context) => Box::new(GpuCollisionDetector::new(
                        Arc::new(context),
                        Duration::from_secs(config.fence_timeout_secs),
                    )),
                    Err(e) => {
                        log::warn!("compute device unavailable, using cpu collision: {e}");
                        Box::new(CpuCollisionBackend)
                    }
                };
                let inertia = PointMass;
                let mut clock = PhysicsClock::new(config.max_delta_time);

                log::info!("physics thread started");
                while !thread_shutdown.load(Ordering::Relaxed) {
                    clock.tick();
                    scene.physics_update(
                        backend.as_mut(),
                        &config,
                        &inertia,
                        clock.delta_seconds(),
                        Instant::now(),
                    );
                    thread_share.publish(&scene);
                }
                log::info!("physics thread stopped");
                scene
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            share,
        })
    }

    /// Snapshot buffer fed by the physics thread.
    pub fn share(&self) -> Arc<TransformShare> {
        Arc::clone(&self.share)
    }

    /// Stops the loop, joins the thread, and returns the scene.
    ///
    /// Returns `None` if the physics thread panicked.
    pub fn shutdown(mut self) -> Option<Scene> {
        self.shutdown.store(true, Ordering::Relaxed);
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(scene) => Some(scene),
            Err(_) => {
                log::error!("physics thread panicked before shutdown");
                None
            }
        }
    }
}

impl Drop for PhysicsRunner {
    fn drop(&mut self) {
        // A dropped runner stops the loop even without an explicit
        // shutdown call; the scene is lost with the detached thread.
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
