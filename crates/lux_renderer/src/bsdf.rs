//! BSDF importance sampling.
//!
//! A material's mean diffuse, specular and refractive reflectances act as
//! the probabilities of choosing each scattering event. Whatever is left over
//! is absorption, which ends the path.

use crate::gen_f32;
use lux_core::{IllumModel, Material};
use lux_math::{Color, Vec2, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sampled continuation of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    /// Unit outgoing direction
    pub direction: Vec3,
    /// Throughput multiplier, already divided by the event probability
    pub weight: Color,
}

/// Sample a scattering event at a surface.
///
/// `incoming` is the unit direction the path arrived along and `normal` the
/// unit shading normal. Exactly three random numbers are consumed whatever
/// the outcome. Returns `None` when the path is absorbed.
pub fn sample_bsdf(
    material: &Material,
    normal: Vec3,
    incoming: Vec3,
    uv: Vec2,
    rng: &mut dyn RngCore,
) -> Option<Scatter> {
    let p = gen_f32(rng);
    let x = gen_f32(rng);
    let y = gen_f32(rng);

    let w_diffuse = material.diffuse_weight();
    let w_specular = material.specular_weight();

    if p < w_diffuse {
        // Malley's method: uniform disk projected onto the hemisphere
        let direction = around(normal, x.sqrt(), (1.0 - x).sqrt(), y);
        return Some(Scatter {
            direction,
            weight: material.diffuse_at(uv) / w_diffuse,
        });
    }

    if p < w_diffuse + w_specular {
        let mirror = reflect(incoming, normal);
        let cos = x.powf(1.0 / (material.specular_exponent + 1.0));
        let sin = (1.0 - cos * cos).max(0.0).sqrt();
        return Some(Scatter {
            direction: around(mirror, cos, sin, y),
            weight: material.specular / w_specular,
        });
    }

    if material.illum == IllumModel::Refraction {
        let w_refractive = material.refractive_weight();
        if p < w_diffuse + w_specular + w_refractive {
            return Some(Scatter {
                direction: refract(incoming, normal, material.ior),
                weight: material.refractive / w_refractive,
            });
        }
    }

    None
}

/// Direction at angle (cos, sin) from `axis` with azimuth `2 pi * turn`.
fn around(axis: Vec3, cos: f32, sin: f32, turn: f32) -> Vec3 {
    let u = axis.any_orthonormal_vector();
    let v = axis.cross(u);
    let phi = 2.0 * PI * turn;
    (axis * cos + (u * phi.cos() + v * phi.sin()) * sin).normalize_or_zero()
}

/// Mirror `incoming` about the plane with normal `normal`.
fn reflect(incoming: Vec3, normal: Vec3) -> Vec3 {
    (incoming - 2.0 * incoming.dot(normal) * normal).normalize_or_zero()
}

/// Snell refraction through an interface of relative index `ior`.
///
/// A path with `normal . incoming < 0` is entering the medium. Total internal
/// reflection falls back to the mirror direction.
fn refract(incoming: Vec3, normal: Vec3, ior: f32) -> Vec3 {
    let cos1 = normal.dot(-incoming);
    let sin1 = (1.0 - cos1 * cos1).max(0.0).sqrt();
    let entering = cos1 > 0.0;
    let sin2 = if entering { sin1 / ior } else { sin1 * ior };

    if sin2 > 1.0 {
        return reflect(incoming, normal);
    }

    let cos2 = (1.0 - sin2 * sin2).max(0.0).sqrt();
    let direction = if entering {
        incoming / ior + (cos1 / ior - cos2) * normal
    } else {
        ior * incoming + (ior * cos1 + cos2) * normal
    };
    direction.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use lux_core::Texture;
    use std::sync::Arc;

    const SAMPLES: usize = 100_000;

    fn mean_weight(material: &Material, rng: &mut StdRng) -> Color {
        let normal = Vec3::Z;
        let incoming = Vec3::new(1.0, 0.0, -1.0).normalize();
        let mut sum = Color::ZERO;
        for _ in 0..SAMPLES {
            if let Some(s) = sample_bsdf(material, normal, incoming, Vec2::ZERO, rng) {
                sum += s.weight;
            }
        }
        sum / SAMPLES as f32
    }

    #[test]
    fn test_diffuse_only_is_unbiased() {
        let mut rng = StdRng::seed_from_u64(42);
        let material = Material::new("red", Color::new(0.6, 0.3, 0.3))
            .with_specular(Color::ZERO, 10.0);

        let mean = mean_weight(&material, &mut rng);
        assert!((mean - material.diffuse).abs().max_element() < 0.01, "mean {mean}");
    }

    #[test]
    fn test_mixed_lobes_are_unbiased() {
        let mut rng = StdRng::seed_from_u64(7);
        let material = Material::new("mix", Color::splat(0.4))
            .with_specular(Color::new(0.2, 0.3, 0.1), 50.0);

        let mean = mean_weight(&material, &mut rng);
        let expected = material.diffuse + material.specular;
        assert!((mean - expected).abs().max_element() < 0.015, "mean {mean}");
    }

    #[test]
    fn test_diffuse_directions_stay_above_surface() {
        let mut rng = StdRng::seed_from_u64(3);
        let material = Material::new("white", Color::ONE).with_specular(Color::ZERO, 1.0);
        let normal = Vec3::new(0.3, -0.2, 0.9).normalize();

        let mut cos_sum = 0.0;
        for _ in 0..10_000 {
            let s = sample_bsdf(&material, normal, Vec3::NEG_Z, Vec2::ZERO, &mut rng)
                .expect("white diffuse never absorbs");
            assert!((s.direction.length() - 1.0).abs() < 1e-4);
            let cos = s.direction.dot(normal);
            assert!(cos >= -1e-4);
            cos_sum += cos;
        }
        // Cosine-weighted hemisphere has E[cos] = 2/3
        assert!((cos_sum / 10_000.0 - 2.0 / 3.0).abs() < 0.02);
    }

    #[test]
    fn test_black_material_absorbs() {
        let mut rng = StdRng::seed_from_u64(1);
        let material = Material::new("black", Color::ZERO).with_specular(Color::ZERO, 1.0);
        for _ in 0..100 {
            assert!(sample_bsdf(&material, Vec3::Z, Vec3::NEG_Z, Vec2::ZERO, &mut rng).is_none());
        }
    }

    #[test]
    fn test_refraction_bends_toward_normal() {
        let incoming = Vec3::new(1.0, 0.0, -1.0).normalize();
        let out = refract(incoming, Vec3::Z, 1.5);
        assert!(out.z < 0.0);
        // Snell: sin2 = sin(45deg) / 1.5
        let sin2 = (out.x * out.x + out.y * out.y).sqrt();
        assert!((sin2 - (0.5f32).sqrt() / 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_refraction_total_internal_reflection() {
        // Leaving glass at a grazing angle
        let incoming = Vec3::new(0.9, 0.0, 0.1).normalize();
        let out = refract(incoming, Vec3::Z, 1.5);
        assert!((out - Vec3::new(incoming.x, 0.0, -incoming.z)).length() < 1e-5);
    }

    #[test]
    fn test_refractive_material_transmits() {
        let mut rng = StdRng::seed_from_u64(11);
        let material = Material::new("glass", Color::ZERO)
            .with_specular(Color::ZERO, 1.0)
            .with_refraction(Color::ONE, 1.5);

        let s = sample_bsdf(&material, Vec3::Z, Vec3::NEG_Z, Vec2::ZERO, &mut rng)
            .expect("clear glass always transmits");
        assert!((s.direction - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(s.weight, Color::ONE);
    }

    #[test]
    fn test_textured_diffuse_weight() {
        let mut rng = StdRng::seed_from_u64(21);
        let texture = Texture::new(2, 1, vec![Color::X, Color::new(0.2, 0.4, 0.9)], "checker");
        let material = Material::new("tex", Color::splat(0.5))
            .with_specular(Color::ZERO, 1.0)
            .with_texture(Arc::new(texture));

        let uv = Vec2::new(0.5, 0.0);
        let mut sum = Color::ZERO;
        for _ in 0..SAMPLES {
            if let Some(s) = sample_bsdf(&material, Vec3::Z, Vec3::NEG_Z, uv, &mut rng) {
                sum += s.weight;
            }
        }
        // Kd only sets the event probability; the texel sets the colour
        let mean = sum / SAMPLES as f32;
        assert!((mean - Color::new(0.2, 0.4, 0.9)).abs().max_element() < 0.015, "mean {mean}");
    }

    #[test]
    fn test_refraction_branch_is_unbiased() {
        let mut rng = StdRng::seed_from_u64(5);
        let material = Material::new("tinted glass", Color::splat(0.2))
            .with_specular(Color::splat(0.1), 200.0)
            .with_refraction(Color::new(0.6, 0.5, 0.7), 1.5);
        let incoming = Vec3::new(1.0, 0.0, -1.0).normalize();

        // Diffuse and glossy lobes stay above the surface; only refraction goes below
        let mut transmitted = Color::ZERO;
        for _ in 0..SAMPLES {
            if let Some(s) = sample_bsdf(&material, Vec3::Z, incoming, Vec2::ZERO, &mut rng) {
                if s.direction.z < 0.0 {
                    transmitted += s.weight;
                }
            }
        }
        let mean = transmitted / SAMPLES as f32;
        assert!((mean - material.refractive).abs().max_element() < 0.015, "mean {mean}");
    }

    #[test]
    fn test_refraction_exiting_medium() {
        let mut rng = StdRng::seed_from_u64(13);
        let material = Material::new("glass", Color::ZERO)
            .with_specular(Color::ZERO, 1.0)
            .with_refraction(Color::ONE, 1.5);

        // Travelling out through the surface: normal . incoming > 0
        let incoming = Vec3::new(0.3, 0.0, (1.0f32 - 0.09).sqrt());
        let s = sample_bsdf(&material, Vec3::Z, incoming, Vec2::ZERO, &mut rng)
            .expect("clear glass always transmits");
        assert!(s.direction.z > 0.0);
        // sin2 = sin1 * ior
        assert!((s.direction.x - 0.45).abs() < 1e-4);
        assert!(s.direction.y.abs() < 1e-6);
    }

    #[test]
    fn test_basic_model_never_refracts() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut material = Material::new("not glass", Color::ZERO).with_specular(Color::ZERO, 1.0);
        material.refractive = Color::ONE;
        assert_eq!(material.illum, IllumModel::Basic);

        for _ in 0..1_000 {
            assert!(sample_bsdf(&material, Vec3::Z, Vec3::NEG_Z, Vec2::ZERO, &mut rng).is_none());
        }
    }
}
