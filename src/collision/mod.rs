//! Narrow-phase collision backends.
//!
//! The physics core treats the pairwise mesh test as an opaque service
//! behind [`CollisionBackend`]: the GPU detector in [`gpu`] is the primary
//! implementation, [`cpu`] is the reference used by tests and as a fallback
//! when no compute adapter exists.

pub mod cpu;
pub mod gpu;
pub mod triangle;

use std::sync::atomic::{AtomicUsize, Ordering};

use glam::{Mat4, Vec3, Vec4};

/// Borrowed view of one mesh plus its object-to-world matrix, as handed to a
/// backend for a single pairwise test.
#[derive(Debug, Clone, Copy)]
pub struct MeshSnapshot<'a> {
    pub positions: &'a [Vec3],
    pub indices: &'a [u32],
    pub world: Mat4,
}

impl MeshSnapshot<'_> {
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Identifies which input mesh a contact's colliding triangle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSource {
    MeshA,
    MeshB,
}

/// One decoded contact: world-space position, face normal, and the mesh
/// whose face was hit (the contact receiver).
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub position: Vec4,
    pub normal: Vec4,
    pub source: ContactSource,
}

/// Outcome of one pairwise test. `collided` is false both for a genuinely
/// contact-free pair and for a failed test; the physics step treats the two
/// identically.
#[derive(Debug, Clone, Default)]
pub struct PairHits {
    pub contacts: Vec<Contact>,
    pub collided: bool,
}

/// All-pairs triangle test between two meshes in world space.
pub trait CollisionBackend {
    fn test_pair(&mut self, a: MeshSnapshot<'_>, b: MeshSnapshot<'_>) -> PairHits;
}

/// Counts resource create/destroy events so tests can assert that a
/// collision test leaks nothing, on success or failure.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    created: AtomicUsize,
    destroyed: AtomicUsize,
}

impl ResourceLedger {
    pub fn record_create(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::Relaxed)
    }

    /// True when every created resource has been destroyed.
    pub fn is_balanced(&self) -> bool {
        self.created() == self.destroyed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Test double mirroring the per-call session protocol: five buffer
    /// handles plus a pipeline handle, all registered with the ledger and
    /// released when the session drops, including on injected failures.
    struct MockSession {
        ledger: Arc<ResourceLedger>,
        handles: usize,
    }

    impl MockSession {
        fn allocate(ledger: Arc<ResourceLedger>) -> Self {
            // Five storage buffers + one pipeline.
            let handles = 6;
            for _ in 0..handles {
                ledger.record_create();
            }
            Self { ledger, handles }
        }
    }

    impl Drop for MockSession {
        fn drop(&mut self) {
            for _ in 0..self.handles {
                self.ledger.record_destroy();
            }
        }
    }

    struct MockBackend {
        ledger: Arc<ResourceLedger>,
        fail: bool,
    }

    impl MockBackend {
        fn run_session(&mut self) -> Result<PairHits, &'static str> {
            let _session = MockSession::allocate(self.ledger.clone());
            if self.fail {
                return Err("device lost");
            }
            Ok(PairHits {
                contacts: Vec::new(),
                collided: false,
            })
        }
    }

    impl CollisionBackend for MockBackend {
        fn test_pair(&mut self, _a: MeshSnapshot<'_>, _b: MeshSnapshot<'_>) -> PairHits {
            self.run_session().unwrap_or_default()
        }
    }

    fn snapshot_pair() -> (Vec<Vec3>, Vec<u32>) {
        (
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn session_resources_are_released_on_success() {
        let ledger = Arc::new(ResourceLedger::default());
        let mut backend = MockBackend {
            ledger: ledger.clone(),
            fail: false,
        };
        let (positions, indices) = snapshot_pair();
        let snapshot = MeshSnapshot {
            positions: &positions,
            indices: &indices,
            world: Mat4::IDENTITY,
        };

        let hits = backend.test_pair(snapshot, snapshot);
        assert!(!hits.collided);
        assert_eq!(ledger.created(), 6);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn session_resources_are_released_on_failure() {
        let ledger = Arc::new(ResourceLedger::default());
        let mut backend = MockBackend {
            ledger: ledger.clone(),
            fail: true,
        };
        let (positions, indices) = snapshot_pair();
        let snapshot = MeshSnapshot {
            positions: &positions,
            indices: &indices,
            world: Mat4::IDENTITY,
        };

        // A failed test reports no collision and still frees everything.
        let hits = backend.test_pair(snapshot, snapshot);
        assert!(!hits.collided);
        assert!(hits.contacts.is_empty());
        assert!(ledger.is_balanced());
    }
}
