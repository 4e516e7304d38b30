//! Physics delta-time measurement for the free-running update loop.

use std::time::Instant;

/// Measures the wall time between physics ticks, in milliseconds.
#[derive(Debug)]
pub struct PhysicsClock {
    last_tick: Instant,
    /// Time between the last two ticks in milliseconds.
    delta_ms: f64,
    /// Upper clamp on the reported delta, in seconds.
    max_delta_seconds: f32,
}

impl PhysicsClock {
    pub fn new(max_delta_seconds: f32) -> Self {
        Self {
            last_tick: Instant::now(),
            delta_ms: 0.0,
            max_delta_seconds,
        }
    }

    /// Marks the start of a tick and updates the measured delta. A stall
    /// (such as a long collision fence wait) is clamped so the next
    /// integration step stays bounded.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick).as_secs_f64() * 1000.0;
        self.delta_ms = elapsed.min(self.max_delta_seconds as f64 * 1000.0);
        self.last_tick = now;
    }

    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    pub fn delta_seconds(&self) -> f32 {
        (self.delta_ms * 0.001) as f32
    }
}
