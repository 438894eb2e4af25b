//! Radiance accumulation and 8-bit export.

use crate::bucket::BucketResult;
use image::{ImageResult, Rgb, RgbImage};
use lux_math::Color;
use std::path::Path;

/// Per-pixel radiance sums and the number of samples behind each.
pub struct Film {
    width: u32,
    height: u32,
    radiance: Vec<Color>,
    samples: Vec<u32>,
}

impl Film {
    pub fn new(width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            radiance: vec![Color::ZERO; count],
            samples: vec![0; count],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Add `count` samples summing to `radiance` at pixel (x, y).
    pub fn accumulate(&mut self, x: u32, y: u32, radiance: Color, count: u32) {
        let idx = self.index(x, y);
        self.radiance[idx] += radiance;
        self.samples[idx] += count;
    }

    /// Copy a finished bucket into its region.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let b = &result.bucket;
        for local_y in 0..b.height {
            for local_x in 0..b.width {
                let local = (local_y * b.width + local_x) as usize;
                self.accumulate(
                    b.x + local_x,
                    b.y + local_y,
                    result.radiance[local],
                    result.samples[local],
                );
            }
        }
    }

    /// Mean radiance at pixel (x, y); black when nothing was sampled.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = self.index(x, y);
        match self.samples[idx] {
            0 => Color::ZERO,
            n => self.radiance[idx] / n as f32,
        }
    }

    /// Total samples taken across the film.
    pub fn total_samples(&self) -> u64 {
        self.samples.iter().map(|&n| n as u64).sum()
    }

    /// Gamma-encoded 8-bit image.
    pub fn to_rgb8(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.pixel(x, y);
            Rgb([tonemap(c.x), tonemap(c.y), tonemap(c.z)])
        })
    }

    /// Write the image as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.to_rgb8()
            .save_with_format(path, image::ImageFormat::Png)
    }
}

/// Clamp to [0, 1], apply 1/2.2 gamma and truncate to a byte.
pub fn tonemap(value: f32) -> u8 {
    // NaN clamps to NaN and casts to 0
    (value.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0) as u8
}
