//! Scene assembly and validation.
//!
//! A [`Scene`] owns the concatenated triangle soup, the sphere set, every
//! material, the lights and the BVH. It is built once through
//! [`SceneBuilder`] and is read-only while rendering.

use crate::bvh::BvhNode;
use lux_core::{Light, Material, Mesh, Sphere};
use lux_math::{Color, Quat, Vec2, Vec3};
use std::time::Instant;
use thiserror::Error;

/// Errors detected while assembling a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Mesh has {positions} positions, {normals} normals, {uvs} UVs and {faces} face materials")]
    InconsistentMesh {
        positions: usize,
        normals: usize,
        uvs: usize,
        faces: usize,
    },

    #[error("Face {face} references material {material}, but the scene has {count} materials")]
    InvalidFaceMaterial {
        face: usize,
        material: usize,
        count: usize,
    },

    #[error("Sphere {index} references material {material}, but the scene has {count} materials")]
    InvalidSphereMaterial {
        index: usize,
        material: usize,
        count: usize,
    },

    #[error("Sphere {index} has non-positive radius {radius}")]
    InvalidRadius { index: usize, radius: f32 },
}

/// Immutable render-ready scene.
pub struct Scene {
    pub(crate) positions: Vec<Vec3>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) uvs: Vec<Vec2>,
    pub(crate) face_materials: Vec<usize>,
    pub(crate) spheres: Vec<Sphere>,
    pub(crate) materials: Vec<Material>,
    pub(crate) lights: Vec<Light>,
    pub(crate) background: Color,
    pub(crate) bvh: BvhNode,
}

impl Scene {
    /// Start assembling a scene.
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn bvh(&self) -> &BvhNode {
        &self.bvh
    }

    pub fn triangle_count(&self) -> usize {
        self.face_materials.len()
    }
}

/// Collects geometry, materials and lights, then validates them into a [`Scene`].
///
/// Meshes keep their own material lists; `add_mesh` appends those to the
/// scene's list and rebases the face indices.
pub struct SceneBuilder {
    soup: Mesh,
    spheres: Vec<Sphere>,
    lights: Vec<Light>,
    background: Color,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            soup: Mesh::new(),
            spheres: Vec::new(),
            lights: Vec::new(),
            background: Color::ZERO,
        }
    }

    /// Append a mesh and its materials.
    pub fn add_mesh(&mut self, mesh: Mesh) -> &mut Self {
        let offset = self.soup.materials.len();
        let Mesh {
            positions,
            normals,
            uvs,
            face_materials,
            materials,
        } = mesh;

        self.soup.positions.extend(positions);
        self.soup.normals.extend(normals);
        self.soup.uvs.extend(uvs);
        self.soup
            .face_materials
            .extend(face_materials.into_iter().map(|m| m + offset));
        self.soup.materials.extend(materials);
        self
    }

    /// Append a material on its own and return its scene index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.soup.materials.push(material);
        self.soup.materials.len() - 1
    }

    /// Append a sphere with its own material.
    pub fn add_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        material: Material,
        orientation: Quat,
    ) -> &mut Self {
        let index = self.add_material(material);
        self.spheres
            .push(Sphere::new(center, radius, index).with_orientation(orientation));
        self
    }

    /// Append a sphere that refers to an existing scene material.
    pub fn add_sphere_instance(&mut self, sphere: Sphere) -> &mut Self {
        self.spheres.push(sphere);
        self
    }

    pub fn add_light(&mut self, light: Light) -> &mut Self {
        self.lights.push(light);
        self
    }

    /// Radiance returned by rays that leave the scene.
    pub fn background(&mut self, color: Color) -> &mut Self {
        self.background = color;
        self
    }

    pub fn material_count(&self) -> usize {
        self.soup.materials.len()
    }

    /// Validate everything and build the BVH.
    pub fn build(self) -> Result<Scene, SceneError> {
        let soup = self.soup;
        if !soup.is_consistent() {
            return Err(SceneError::InconsistentMesh {
                positions: soup.positions.len(),
                normals: soup.normals.len(),
                uvs: soup.uvs.len(),
                faces: soup.face_materials.len(),
            });
        }

        let count = soup.materials.len();
        if let Some((face, &material)) = soup
            .face_materials
            .iter()
            .enumerate()
            .find(|(_, &m)| m >= count)
        {
            return Err(SceneError::InvalidFaceMaterial {
                face,
                material,
                count,
            });
        }

        for (index, sphere) in self.spheres.iter().enumerate() {
            if sphere.material >= count {
                return Err(SceneError::InvalidSphereMaterial {
                    index,
                    material: sphere.material,
                    count,
                });
            }
            if sphere.radius.is_nan() || sphere.radius <= 0.0 {
                return Err(SceneError::InvalidRadius {
                    index,
                    radius: sphere.radius,
                });
            }
        }

        let start = Instant::now();
        let bvh = BvhNode::new(&soup.positions);
        log::info!(
            "Built BVH over {} triangles in {:.2?} (depth {})",
            soup.face_materials.len(),
            start.elapsed(),
            bvh.depth()
        );
        log::info!(
            "Scene: {} triangles, {} spheres, {} materials, {} lights",
            soup.face_materials.len(),
            self.spheres.len(),
            count,
            self.lights.len()
        );

        Ok(Scene {
            positions: soup.positions,
            normals: soup.normals,
            uvs: soup.uvs,
            face_materials: soup.face_materials,
            spheres: self.spheres,
            materials: soup.materials,
            lights: self.lights,
            background: self.background,
            bvh,
        })
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh(material_name: &str) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.materials.push(Material::new(material_name, Color::splat(0.5)));
        mesh.push_flat_triangle([Vec3::ZERO, Vec3::X, Vec3::Y], 0);
        mesh.push_flat_triangle([Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y], 0);
        mesh
    }

    #[test]
    fn test_builder_offsets_mesh_materials() {
        let mut builder = Scene::builder();
        builder.add_sphere(Vec3::ZERO, 1.0, Material::default(), Quat::IDENTITY);
        builder.add_mesh(quad_mesh("a")).add_mesh(quad_mesh("b"));
        let scene = builder.build().expect("valid scene");

        assert_eq!(scene.materials().len(), 3);
        assert_eq!(scene.triangle_count(), 4);
        assert_eq!(scene.face_materials, vec![1, 1, 2, 2]);
        assert_eq!(scene.materials()[2].name, "b");
        assert_eq!(scene.spheres()[0].material, 0);
    }

    #[test]
    fn test_builder_rejects_bad_face_material() {
        let mut mesh = quad_mesh("a");
        mesh.face_materials[1] = 5;
        let mut builder = Scene::builder();
        builder.add_mesh(mesh);
        assert!(matches!(
            builder.build(),
            Err(SceneError::InvalidFaceMaterial { face: 1, material: 5, .. })
        ));
    }

    #[test]
    fn test_builder_rejects_inconsistent_mesh() {
        let mut mesh = quad_mesh("a");
        mesh.uvs.pop();
        let mut builder = Scene::builder();
        builder.add_mesh(mesh);
        assert!(matches!(builder.build(), Err(SceneError::InconsistentMesh { .. })));
    }

    #[test]
    fn test_builder_rejects_bad_spheres() {
        let mut builder = Scene::builder();
        builder.add_sphere(Vec3::ZERO, 0.0, Material::default(), Quat::IDENTITY);
        assert!(matches!(builder.build(), Err(SceneError::InvalidRadius { index: 0, .. })));

        let mut builder = Scene::builder();
        builder.add_sphere_instance(Sphere::new(Vec3::ZERO, 1.0, 3));
        assert!(matches!(
            builder.build(),
            Err(SceneError::InvalidSphereMaterial { index: 0, material: 3, count: 0 })
        ));
    }

    #[test]
    fn test_empty_scene_builds() {
        let mut builder = Scene::builder();
        builder.background(Color::splat(0.25));
        let scene = builder.build().expect("empty scene is valid");
        assert_eq!(scene.triangle_count(), 0);
        assert_eq!(scene.background(), Color::splat(0.25));
    }
}
