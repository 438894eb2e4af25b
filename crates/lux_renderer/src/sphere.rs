//! Ray-sphere intersection and spherical UV mapping.

use crate::hit::HIT_EPSILON;
use lux_math::{Quat, Ray, Vec2, Vec3};
use std::f32::consts::PI;

/// Both ray parameters where the ray crosses the sphere, nearest first.
///
/// Assumes a unit-length direction. Returns `None` when the ray misses.
pub fn sphere_roots(ray: &Ray, center: Vec3, radius: f32) -> Option<(f32, f32)> {
    let delta = center - ray.origin;
    let b = delta.dot(ray.direction);
    let c = delta.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    Some((b - root, b + root))
}

/// Nearest root in `(HIT_EPSILON, t_max)`.
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32, t_max: f32) -> Option<f32> {
    let (near, far) = sphere_roots(ray, center, radius)?;
    [near, far]
        .into_iter()
        .find(|&t| t > HIT_EPSILON && t < t_max)
}

/// Texture coordinates for an outward normal in the sphere's UV frame.
pub fn sphere_uv(orientation: Quat, normal: Vec3) -> Vec2 {
    let o = orientation * normal;
    Vec2::new(
        o.y.atan2(o.x) / (2.0 * PI),
        o.z.clamp(-1.0, 1.0).acos() / PI,
    )
}
