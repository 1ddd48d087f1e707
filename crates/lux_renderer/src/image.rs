//! Image buffer for render output.

use std::path::Path;

use image::{Rgb, RgbImage};
use lux_math::{Color, Interval};
use thiserror::Error;

/// Errors raised while writing images.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot downsample {width}x{height} by {factor}")]
    InvalidFactor { width: u32, height: u32, factor: u32 },
}

/// Linear RGB pixels in row-major order, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Multiply every pixel by `tint`.
    pub fn scale(&mut self, tint: Color) {
        for pixel in &mut self.pixels {
            *pixel *= tint;
        }
    }

    /// Box filter `factor × factor` blocks into single pixels.
    pub fn downsample(&self, factor: u32) -> Result<ImageBuffer, ImageError> {
        if factor == 0 || self.width % factor != 0 || self.height % factor != 0 {
            return Err(ImageError::InvalidFactor {
                width: self.width,
                height: self.height,
                factor,
            });
        }

        let mut out = ImageBuffer::new(self.width / factor, self.height / factor);
        let area = (factor * factor) as f64;
        for y in 0..out.height {
            for x in 0..out.width {
                let mut sum = Color::ZERO;
                for dy in 0..factor {
                    for dx in 0..factor {
                        sum += self.get(x * factor + dx, y * factor + dy);
                    }
                }
                out.set(x, y, sum / area);
            }
        }
        Ok(out)
    }

    /// Clamp to [0, 1] and quantize to 8 bits per channel.
    pub fn to_rgb8(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let color = self.get(x, y);
            let quantize = |c: f64| (Interval::UNIT.clamp(c) * 255.0).round() as u8;
            Rgb([quantize(color.x), quantize(color.y), quantize(color.z)])
        })
    }

    /// Write the image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        let path = path.as_ref();
        self.to_rgb8().save(path).map_err(|source| ImageError::Encode {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
