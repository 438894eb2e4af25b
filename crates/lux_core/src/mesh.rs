//! Triangle soup geometry.
//!
//! Every face owns three consecutive entries in `positions`, `normals` and
//! `uvs`; there is no vertex sharing. This is the form the loaders emit and the
//! form the renderer's BVH consumes.

use lux_math::{Aabb, Vec2, Vec3};

use crate::material::Material;

/// A flat list of triangles with per-vertex attributes and per-face materials.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Vertex positions, three per face
    pub positions: Vec<Vec3>,

    /// Vertex normals, parallel to `positions`
    pub normals: Vec<Vec3>,

    /// UV coordinates, parallel to `positions`
    pub uvs: Vec<Vec2>,

    /// One index into `materials` per face
    pub face_materials: Vec<usize>,

    /// Materials referenced by this mesh's faces
    pub materials: Vec<Material>,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one triangle.
    pub fn push_triangle(&mut self, positions: [Vec3; 3], normals: [Vec3; 3], uvs: [Vec2; 3], material: usize) {
        self.positions.extend_from_slice(&positions);
        self.normals.extend_from_slice(&normals);
        self.uvs.extend_from_slice(&uvs);
        self.face_materials.push(material);
    }

    /// Append a triangle shaded with its flat face normal and zero UVs.
    pub fn push_flat_triangle(&mut self, positions: [Vec3; 3], material: usize) {
        let n = face_normal(positions);
        self.push_triangle(positions, [n; 3], [Vec2::ZERO; 3], material);
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.face_materials.len()
    }

    /// Check if the mesh holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.face_materials.is_empty()
    }

    /// True when the attribute sequences agree with the face count.
    pub fn is_consistent(&self) -> bool {
        let vertex_count = self.triangle_count() * 3;
        self.positions.len() == vertex_count
            && self.normals.len() == vertex_count
            && self.uvs.len() == vertex_count
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_vertices(&self.positions)
    }
}

/// Unit normal of a counter-clockwise triangle, zero when degenerate.
pub fn face_normal([p0, p1, p2]: [Vec3; 3]) -> Vec3 {
    (p1 - p0).cross(p2 - p0).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> [Vec3; 3] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_push_triangle() {
        let mut mesh = Mesh::new();
        assert!(mesh.is_empty());

        mesh.push_flat_triangle(unit_triangle(), 0);
        mesh.push_flat_triangle(unit_triangle().map(|p| p + Vec3::Z), 0);

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.positions.len(), 6);
        assert!(mesh.is_consistent());
        assert_eq!(mesh.positions[3], Vec3::Z);
    }

    #[test]
    fn test_face_normal() {
        // CCW in the XY plane viewed from +Z
        assert_eq!(face_normal(unit_triangle()), Vec3::Z);

        let degenerate = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        assert_eq!(face_normal(degenerate), Vec3::ZERO);
    }

    #[test]
    fn test_inconsistent_mesh() {
        let mut mesh = Mesh::new();
        mesh.push_flat_triangle(unit_triangle(), 0);
        mesh.uvs.pop();
        assert!(!mesh.is_consistent());
    }

    #[test]
    fn test_bounds_computation() {
        let mut mesh = Mesh::new();
        mesh.push_flat_triangle(
            [
                Vec3::new(-1.0, -2.0, -3.0),
                Vec3::new(4.0, 5.0, 6.0),
                Vec3::new(0.0, 0.0, 0.0),
            ],
            0,
        );
        let bounds = mesh.bounds();

        assert!((bounds.x.min - (-1.0)).abs() < 0.001);
        assert!((bounds.x.max - 4.0).abs() < 0.001);
        assert!((bounds.y.max - 5.0).abs() < 0.001);
        assert!((bounds.z.min - (-3.0)).abs() < 0.001);
    }
}
