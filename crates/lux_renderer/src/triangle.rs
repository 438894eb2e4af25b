//! Ray-triangle intersection.
//!
//! Uses the Möller-Trumbore algorithm.

use crate::hit::HIT_EPSILON;
use lux_math::{Ray, Vec3};

/// Distance and barycentric coordinates of a triangle hit.
///
/// The hit point is `(1 - u - v) * p0 + u * p1 + v * p2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

impl TriangleHit {
    /// Interpolate a per-vertex attribute at the hit.
    pub fn interpolate<T>(&self, [a0, a1, a2]: [T; 3]) -> T
    where
        T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
    {
        a0 * (1.0 - self.u - self.v) + a1 * self.u + a2 * self.v
    }
}

/// Intersect a ray with a triangle, accepting only `HIT_EPSILON < t < t_max`.
pub fn intersect_triangle(ray: &Ray, [p0, p1, p2]: &[Vec3; 3], t_max: f32) -> Option<TriangleHit> {
    let edge1 = *p1 - *p0;
    let edge2 = *p2 - *p0;
    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);

    // Ray parallel to the triangle plane
    if det.abs() < f32::EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - *p0;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    if t > HIT_EPSILON && t < t_max {
        Some(TriangleHit { t, u, v })
    } else {
        None
    }
}
