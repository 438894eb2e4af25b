//! Phong-style surface materials, modelled on the MTL format.

use std::sync::Arc;

use lux_math::{Color, Vec2};

use crate::texture::Texture;

/// Illumination model selecting which scattering events a material allows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IllumModel {
    /// Lambertian diffuse + Phong specular.
    #[default]
    Basic,
    /// Basic plus refraction through the surface.
    Refraction,
}

impl IllumModel {
    /// Map an MTL `illum` number. Only 6 enables refraction.
    pub fn from_mtl(illum: u8) -> Self {
        match illum {
            6 => IllumModel::Refraction,
            _ => IllumModel::Basic,
        }
    }
}

/// A surface material.
///
/// The means of `diffuse`, `specular` and `refractive` double as the
/// probabilities of each scattering event; whatever is left over is absorbed.
#[derive(Clone, Debug)]
pub struct Material {
    /// Material name (from the MTL file)
    pub name: String,

    /// Ambient reflectance (Ka), carried for completeness
    pub ambient: Color,

    /// Diffuse reflectance (Kd)
    pub diffuse: Color,

    /// Specular reflectance (Ks)
    pub specular: Color,

    /// Refractive transmittance (Kr)
    pub refractive: Color,

    /// Phong exponent (Ns)
    pub specular_exponent: f32,

    /// Index of refraction (Ni)
    pub ior: f32,

    pub illum: IllumModel,

    /// Replaces `diffuse` where present (map_Kd)
    pub diffuse_texture: Option<Arc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "DefaultMaterial".to_string(),
            ambient: Color::ZERO,
            diffuse: Color::splat(0.8),
            specular: Color::splat(0.1),
            refractive: Color::ZERO,
            specular_exponent: 128.0,
            ior: 1.45,
            illum: IllumModel::Basic,
            diffuse_texture: None,
        }
    }
}

impl Material {
    /// Create a new material with just a name and diffuse color.
    pub fn new(name: impl Into<String>, diffuse: Color) -> Self {
        Self {
            name: name.into(),
            diffuse,
            ..Default::default()
        }
    }

    /// Set the specular colour and exponent.
    pub fn with_specular(mut self, specular: Color, exponent: f32) -> Self {
        self.specular = specular;
        self.specular_exponent = exponent;
        self
    }

    /// Enable refraction with the given transmittance and index of refraction.
    pub fn with_refraction(mut self, refractive: Color, ior: f32) -> Self {
        self.refractive = refractive;
        self.ior = ior;
        self.illum = IllumModel::Refraction;
        self
    }

    /// Attach a diffuse texture.
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    /// Diffuse colour at a surface point, texture-sampled when available.
    pub fn diffuse_at(&self, uv: Vec2) -> Color {
        match &self.diffuse_texture {
            Some(texture) => texture.sample(uv),
            None => self.diffuse,
        }
    }

    /// Probability of a diffuse bounce.
    pub fn diffuse_weight(&self) -> f32 {
        mean(self.diffuse)
    }

    /// Probability of a specular bounce.
    pub fn specular_weight(&self) -> f32 {
        mean(self.specular)
    }

    /// Probability of a refractive bounce (only meaningful with `Refraction`).
    pub fn refractive_weight(&self) -> f32 {
        mean(self.refractive)
    }

    pub fn is_refractive(&self) -> bool {
        self.illum == IllumModel::Refraction
    }
}

#[inline]
fn mean(c: Color) -> f32 {
    c.element_sum() / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material() {
        let mat = Material::default();
        assert_eq!(mat.diffuse, Color::splat(0.8));
        assert_eq!(mat.specular_exponent, 128.0);
        assert_eq!(mat.illum, IllumModel::Basic);
        assert!(!mat.is_refractive());
    }

    #[test]
    fn test_event_weights() {
        let mat = Material::new("red", Color::new(0.9, 0.3, 0.0))
            .with_specular(Color::new(0.1, 0.2, 0.3), 64.0)
            .with_refraction(Color::splat(0.5), 1.5);

        assert!((mat.diffuse_weight() - 0.4).abs() < 1e-6);
        assert!((mat.specular_weight() - 0.2).abs() < 1e-6);
        assert!((mat.refractive_weight() - 0.5).abs() < 1e-6);
        assert!(mat.is_refractive());
    }

    #[test]
    fn test_diffuse_at_uses_texture() {
        let plain = Material::new("plain", Color::splat(0.25));
        assert_eq!(plain.diffuse_at(Vec2::ZERO), Color::splat(0.25));

        let textured = plain.with_texture(Arc::new(Texture::solid_color(Color::X)));
        assert_eq!(textured.diffuse_at(Vec2::new(0.3, 0.7)), Color::X);
    }

    #[test]
    fn test_illum_from_mtl() {
        assert_eq!(IllumModel::from_mtl(6), IllumModel::Refraction);
        assert_eq!(IllumModel::from_mtl(3), IllumModel::Basic);
        assert_eq!(IllumModel::from_mtl(2), IllumModel::Basic);
    }
}
