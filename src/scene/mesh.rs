//! Mesh geometry as the physics core consumes it: vertex positions and
//! triangle indices. Rendering attributes live with the renderer, not here.

use glam::{Vec3, Vec4};

/// A collection of vertices and face indices as triangles.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Object-space vertex positions.
    pub positions: Vec<Vec3>,
    /// Three consecutive indices form one triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Number of triangles.
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unweighted average of all vertex positions, in object space. NaN for
    /// an empty mesh; rigid-body initialization rejects those.
    pub fn vertex_average(&self) -> Vec3 {
        let sum: Vec3 = self.positions.iter().copied().sum();
        sum / self.positions.len() as f32
    }

    /// Positions as homogeneous vec4s (w = 1) for storage-buffer upload.
    pub fn homogeneous_positions(&self) -> Vec<Vec4> {
        self.positions.iter().map(|p| p.extend(1.0)).collect()
    }

    /// Axis-aligned unit cube centered on the origin: 8 vertices, 12 faces.
    pub fn unit_cube() -> Self {
        let h = 0.5;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 6, 2, 3, 7, 6, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self { positions, indices }
    }
}
