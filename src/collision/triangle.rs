//! Segment/triangle intersection shared by the CPU reference backend and
//! tests. The GPU kernel implements the same test in WGSL.

use glam::Vec3;

const EPSILON: f32 = 1e-7;

/// Moller-Trumbore intersection of the segment `origin..origin + dir` with a
/// triangle. Returns the intersection point, or None when the segment misses
/// or only the infinite line would hit.
pub fn segment_triangle(origin: Vec3, dir: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<Vec3> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let t_vec = origin - v0;
    let u = t_vec.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = t_vec.cross(edge1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    Some(origin + dir * t)
}

/// Unit normal of a triangle with counter-clockwise winding.
pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}
