//! Texture loading and caching for materials.
//!
//! Textures are decoded once, converted to linear colour and shared between
//! materials through a [`TextureCache`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lux_math::{Color, Vec2};

use crate::error::LoadResult;

/// Display gamma used to linearize 8-bit texels.
const TEXTURE_GAMMA: f32 = 2.2;

/// A loaded texture with linear RGB pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Linear RGB texels, row-major, row 0 at the top
    pub pixels: Vec<Color>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Color) -> Self {
        Self::new(1, 1, vec![color], "<solid>")
    }

    /// Decode an image file into a linear texture.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels = rgb
            .pixels()
            .map(|p| Color::new(linearize(p[0]), linearize(p[1]), linearize(p[2])))
            .collect();

        Ok(Self::new(width, height, pixels, path.to_string_lossy()))
    }

    /// Nearest-texel lookup with wrapped UV coordinates.
    ///
    /// `u` runs along rows, `v` down the columns; both wrap outside [0, 1).
    pub fn sample(&self, uv: Vec2) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }
        let x = wrap_texel(uv.x, self.width);
        let y = wrap_texel(uv.y, self.height);
        self.pixels
            .get(y * self.width as usize + x)
            .copied()
            .unwrap_or(Color::ZERO)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Color>()
    }
}

/// Round a texture coordinate to the nearest texel and wrap it into range.
fn wrap_texel(coord: f32, size: u32) -> usize {
    let size = size.max(1) as i64;
    let texel = (coord * size as f32 + 0.5) as i64;
    texel.rem_euclid(size) as usize
}

/// Convert an 8-bit gamma-encoded channel to linear.
fn linearize(value: u8) -> f32 {
    (value as f32 / 255.0).powf(TEXTURE_GAMMA)
}

/// Cache for loaded textures, keyed by resolved path.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Arc<Texture>>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &Path) -> LoadResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let texture = Arc::new(Texture::load(path)?);
        self.textures.insert(path.to_path_buf(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path.display(),
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
