//! Brute-force CPU reference narrow phase.
//!
//! Mirrors the GPU kernel's contract exactly — same pair ordering, same
//! nearest-contact selection, same receiver attribution — so tests can
//! validate the protocol without a device, and the physics thread can keep
//! simulating when no compute adapter exists.

use glam::Vec3;
use rayon::prelude::*;

use super::triangle::{face_normal, segment_triangle};
use super::{CollisionBackend, Contact, ContactSource, MeshSnapshot, PairHits};

#[derive(Debug, Default)]
pub struct CpuCollisionBackend;

/// World-space triangles of a mesh snapshot.
fn world_triangles(mesh: &MeshSnapshot<'_>) -> Vec<[Vec3; 3]> {
    (0..mesh.face_count())
        .map(|face| {
            let fetch = |corner: usize| {
                let index = mesh.indices[face * 3 + corner] as usize;
                (mesh.world * mesh.positions[index].extend(1.0)).truncate()
            };
            [fetch(0), fetch(1), fetch(2)]
        })
        .collect()
}

/// Nearest contact between one face of mesh A and all of mesh B, the same
/// test each GPU invocation performs for its face.
fn test_face(a: &[Vec3; 3], b_faces: &[[Vec3; 3]]) -> Option<(Vec3, Vec3, ContactSource)> {
    let a_centroid = (a[0] + a[1] + a[2]) / 3.0;
    let a_normal = face_normal(a[0], a[1], a[2]);

    let mut best: Option<(f32, Vec3, Vec3, ContactSource)> = None;
    let mut consider = |point: Vec3, normal: Vec3, source: ContactSource| {
        let distance = (point - a_centroid).length();
        if best.map_or(true, |(d, ..)| distance < d) {
            best = Some((distance, point, normal, source));
        }
    };

    for b in b_faces {
        let b_normal = face_normal(b[0], b[1], b[2]);

        // Edges of the A face against the B face: the hit face is B's.
        for edge in 0..3 {
            let origin = a[edge];
            let tip = a[(edge + 1) % 3];
            if let Some(point) = segment_triangle(origin, tip - origin, b[0], b[1], b[2]) {
                consider(point, b_normal, ContactSource::MeshB);
            }
        }

        // Edges of the B face against the A face: the hit face is A's.
        for edge in 0..3 {
            let origin = b[edge];
            let tip = b[(edge + 1) % 3];
            if let Some(point) = segment_triangle(origin, tip - origin, a[0], a[1], a[2]) {
                consider(point, a_normal, ContactSource::MeshA);
            }
        }
    }

    best.map(|(_, point, normal, source)| (point, normal, source))
}

impl CollisionBackend for CpuCollisionBackend {
    fn test_pair(&mut self, a: MeshSnapshot<'_>, b: MeshSnapshot<'_>) -> PairHits {
        // The mesh with more faces takes slot A, matching the GPU dispatch
        // sizing. Receiver attribution is flipped back if the pair swapped.
        let swapped = a.face_count() < b.face_count();
        let (first, second) = if swapped { (b, a) } else { (a, b) };

        let a_faces = world_triangles(&first);
        let b_faces = world_triangles(&second);

        let contacts: Vec<Contact> = a_faces
            .par_iter()
            .filter_map(|face| test_face(face, &b_faces))
            .map(|(point, normal, source)| {
                let source = match (source, swapped) {
                    (ContactSource::MeshA, false) | (ContactSource::MeshB, true) => {
                        ContactSource::MeshA
                    }
                    _ => ContactSource::MeshB,
                };
                Contact {
                    position: point.extend(match source {
                        ContactSource::MeshA => 0.0,
                        ContactSource::MeshB => 1.0,
                    }),
                    normal: normal.extend(0.0),
                    source,
                }
            })
            .collect();

        PairHits {
            collided: !contacts.is_empty(),
            contacts,
        }
    }
}
