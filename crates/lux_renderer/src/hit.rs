//! Nearest-hit queries against a [`Scene`].

use crate::scene::Scene;
use crate::sphere::{intersect_sphere, sphere_uv};
use crate::triangle::{intersect_triangle, TriangleHit};
use lux_math::{Ray, Vec2, Vec3};

/// Minimum accepted ray parameter. Keeps secondary rays off their own surface.
pub const HIT_EPSILON: f32 = 1e-5;

/// Surface information at the nearest intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the hit; equals distance for unit directions
    pub distance: f32,
    pub material: usize,
    /// Unit shading normal
    pub normal: Vec3,
    pub uv: Vec2,
}

enum Nearest {
    Triangle { face: usize, hit: TriangleHit },
    Sphere { index: usize, t: f32 },
}

impl Scene {
    /// Find the nearest surface along `ray`.
    ///
    /// Triangles from the BVH are tested first, then every sphere. Only a
    /// strictly closer hit replaces the current one.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        let mut best = f32::MAX;
        let mut nearest = None;

        self.bvh.visit_candidates(ray, |candidate| {
            if let Some(hit) = intersect_triangle(ray, candidate.vertices, best) {
                best = hit.t;
                nearest = Some(Nearest::Triangle {
                    face: candidate.face,
                    hit,
                });
            }
        });

        for (index, sphere) in self.spheres.iter().enumerate() {
            if let Some(t) = intersect_sphere(ray, sphere.center, sphere.radius, best) {
                best = t;
                nearest = Some(Nearest::Sphere { index, t });
            }
        }

        nearest.map(|n| match n {
            Nearest::Triangle { face, hit } => {
                let base = face * 3;
                let normals = [self.normals[base], self.normals[base + 1], self.normals[base + 2]];
                let uvs = [self.uvs[base], self.uvs[base + 1], self.uvs[base + 2]];
                Hit {
                    distance: hit.t,
                    material: self.face_materials[face],
                    normal: hit.interpolate(normals).normalize_or_zero(),
                    uv: hit.interpolate(uvs),
                }
            }
            Nearest::Sphere { index, t } => {
                let sphere = &self.spheres[index];
                let normal = (ray.at(t) - sphere.center).normalize_or_zero();
                Hit {
                    distance: t,
                    material: sphere.material,
                    normal,
                    uv: sphere_uv(sphere.orientation, normal),
                }
            }
        })
    }

    /// True when anything lies along `ray` closer than `max_distance`.
    pub fn occluded(&self, ray: &Ray, max_distance: f32) -> bool {
        self.nearest_hit(ray)
            .is_some_and(|hit| hit.distance < max_distance)
    }
}

#[cfg(test)]
mod tests {
    use crate::scene::Scene;
    use lux_core::{Material, Mesh};
    use lux_math::{Color, Quat, Ray, Vec2, Vec3};

    fn floor_and_ball() -> Scene {
        let mut mesh = Mesh::new();
        mesh.materials.push(Material::new("floor", Color::splat(0.5)));
        let n = [Vec3::Z; 3];
        mesh.push_triangle(
            [Vec3::new(-5.0, -5.0, 0.0), Vec3::new(5.0, -5.0, 0.0), Vec3::new(-5.0, 5.0, 0.0)],
            n,
            [Vec2::ZERO, Vec2::X, Vec2::Y],
            0,
        );
        mesh.push_triangle(
            [Vec3::new(5.0, -5.0, 0.0), Vec3::new(5.0, 5.0, 0.0), Vec3::new(-5.0, 5.0, 0.0)],
            n,
            [Vec2::X, Vec2::ONE, Vec2::Y],
            0,
        );

        let mut builder = Scene::builder();
        builder.add_mesh(mesh);
        builder.add_sphere(Vec3::new(0.0, 0.0, 2.0), 1.0, Material::default(), Quat::IDENTITY);
        builder.build().expect("valid scene")
    }

    #[test]
    fn test_nearest_hit_prefers_closer_sphere() {
        let scene = floor_and_ball();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = scene.nearest_hit(&ray).expect("should hit");

        assert_eq!(hit.material, 1);
        assert!((hit.distance - 7.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_nearest_hit_triangle_attributes() {
        let scene = floor_and_ball();
        let ray = Ray::new(Vec3::new(-2.5, -2.5, 10.0), Vec3::NEG_Z);
        let hit = scene.nearest_hit(&ray).expect("should hit floor");

        assert_eq!(hit.material, 0);
        assert!((hit.distance - 10.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert!((hit.uv - Vec2::new(0.25, 0.25)).length() < 1e-4);
    }

    #[test]
    fn test_nearest_hit_miss_and_occlusion() {
        let scene = floor_and_ball();
        let up = Ray::new(Vec3::new(0.0, 0.0, 4.0), Vec3::Z);
        assert!(scene.nearest_hit(&up).is_none());

        let down = Ray::new(Vec3::new(0.0, 0.0, 4.0), Vec3::NEG_Z);
        assert!(scene.occluded(&down, 2.0));
        assert!(!scene.occluded(&down, 0.5));
    }
}
