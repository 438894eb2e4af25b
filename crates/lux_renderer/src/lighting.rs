//! Next-event estimation: direct light from every light source.

use crate::scene::Scene;
use lux_core::{Light, Material};
use lux_math::{Color, Ray, Vec2, Vec3};
use std::f32::consts::PI;

/// Light arriving from one source, before any BRDF is applied.
struct Incident {
    /// Unit direction from the surface toward the light
    to_light: Vec3,
    radiance: Color,
}

/// Unoccluded direct radiance at `point` reflected back along `incoming`.
///
/// Sums a Lambertian term and a normalized Phong term for every light whose
/// shadow ray reaches it.
pub fn direct_contribution(
    scene: &Scene,
    material: &Material,
    point: Vec3,
    normal: Vec3,
    incoming: Vec3,
    uv: Vec2,
) -> Color {
    let diffuse = material.diffuse_at(uv);
    let ns = material.specular_exponent;

    scene
        .lights()
        .iter()
        .filter_map(|light| incident(scene, light, point))
        .map(|Incident { to_light, radiance }| {
            let l_dot_n = to_light.dot(normal);
            let mut color = l_dot_n.max(0.0) * radiance * diffuse / PI;

            let reflected = to_light - 2.0 * l_dot_n * normal;
            let lobe = reflected.dot(incoming).clamp(0.0, 1.0).powf(ns);
            color += (ns + 2.0) / (2.0 * PI) * lobe * radiance * material.specular;
            color
        })
        .fold(Color::ZERO, |acc, c| acc + c)
}

/// Visibility and radiance of a single light at `point`.
fn incident(scene: &Scene, light: &Light, point: Vec3) -> Option<Incident> {
    match *light {
        Light::Sun { color, direction } => {
            let to_light = -direction;
            if scene.occluded(&Ray::new(point, to_light), f32::MAX) {
                return None;
            }
            Some(Incident {
                to_light,
                radiance: color,
            })
        }
        Light::Point { color, position } => {
            let (to_light, dist_sq) = toward(point, position)?;
            if scene.occluded(&Ray::new(point, to_light), dist_sq.sqrt()) {
                return None;
            }
            Some(Incident {
                to_light,
                radiance: color / dist_sq,
            })
        }
        Light::Spot {
            color,
            position,
            direction,
            half_angle,
            exponent,
        } => {
            let (to_light, dist_sq) = toward(point, position)?;
            let cos_a = direction.dot(-to_light).min(1.0);
            if cos_a <= half_angle.cos() {
                return None;
            }
            if scene.occluded(&Ray::new(point, to_light), dist_sq.sqrt()) {
                return None;
            }
            Some(Incident {
                to_light,
                radiance: color * cos_a.powf(exponent) / dist_sq,
            })
        }
    }
}

/// Unit direction and squared distance to a light position.
fn toward(point: Vec3, position: Vec3) -> Option<(Vec3, f32)> {
    let offset = position - point;
    let dist_sq = offset.length_squared();
    if dist_sq <= 0.0 {
        return None;
    }
    Some((offset / dist_sq.sqrt(), dist_sq))
}
