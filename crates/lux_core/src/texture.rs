//! Textures: a function from 2D surface coordinates to a color.
//!
//! Textures live in an arena owned by the scene and are referenced by
//! [`TextureId`]. Procedural textures (checkers, bitmaps) carry orientation
//! hints that each shape turns into its own texture frame on first use.

use std::path::Path;

use lux_math::{Color, DVec3};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Texture {0} has zero size")]
    EmptyImage(String),

    #[error("Texture pattern dimensions must be positive (got {0} x {1})")]
    InvalidDimensions(f64, f64),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Index of a texture in the scene's texture table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// A texture kind.
#[derive(Debug, Clone)]
pub enum Texture {
    /// Constant color, ignores coordinates.
    Colored(Color),
    Checkers(Checkers),
    Bitmap(Bitmap),
}

impl Texture {
    /// Color at surface coordinates (x, y).
    pub fn color_at(&self, x: f64, y: f64) -> Color {
        match self {
            Texture::Colored(color) => *color,
            Texture::Checkers(checkers) => checkers.color_at(x, y),
            Texture::Bitmap(bitmap) => bitmap.color_at(x, y),
        }
    }

    /// Procedural textures depend on the surface frame and cannot be shared.
    pub fn is_procedural(&self) -> bool {
        !matches!(self, Texture::Colored(_))
    }

    /// Orientation hints (each unit length or zero).
    pub fn orientation(&self) -> (DVec3, DVec3) {
        match self {
            Texture::Colored(_) => (DVec3::ZERO, DVec3::ZERO),
            Texture::Checkers(checkers) => (checkers.text_x, checkers.text_y),
            Texture::Bitmap(bitmap) => (bitmap.text_x, bitmap.text_y),
        }
    }
}

/// Alternating two-color squares of `x_dim` by `y_dim`.
#[derive(Debug, Clone)]
pub struct Checkers {
    text_x: DVec3,
    text_y: DVec3,
    x_dim: f64,
    y_dim: f64,
    even: Color,
    odd: Color,
}

impl Checkers {
    pub fn new(
        text_x: DVec3,
        text_y: DVec3,
        x_dim: f64,
        y_dim: f64,
        even: Color,
        odd: Color,
    ) -> TextureResult<Self> {
        check_dimensions(x_dim, y_dim)?;
        Ok(Self {
            text_x: text_x.normalize_or_zero(),
            text_y: text_y.normalize_or_zero(),
            x_dim,
            y_dim,
            even,
            odd,
        })
    }

    /// Square parity, mirrored across the axes so that the pattern stays
    /// regular on both sides of zero.
    pub fn color_at(&self, x: f64, y: f64) -> Color {
        let square_x = (x / self.x_dim).trunc() as i64;
        let square_y = (y / self.y_dim).trunc() as i64;
        let even = (square_x + square_y) % 2 == 0;

        if (x * y >= 0.0) == even {
            self.even
        } else {
            self.odd
        }
    }
}

/// An image repeated periodically every `x_dim` by `y_dim`.
#[derive(Debug, Clone)]
pub struct Bitmap {
    text_x: DVec3,
    text_y: DVec3,
    x_dim: f64,
    y_dim: f64,
    width: usize,
    height: usize,
    /// Row-major, top row first
    pixels: Vec<Color>,
}

impl Bitmap {
    /// Build a bitmap texture from already decoded pixels.
    pub fn new(
        text_x: DVec3,
        text_y: DVec3,
        x_dim: f64,
        y_dim: f64,
        width: usize,
        height: usize,
        pixels: Vec<Color>,
    ) -> TextureResult<Self> {
        check_dimensions(x_dim, y_dim)?;
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(TextureError::EmptyImage(format!("{width}x{height}")));
        }
        Ok(Self {
            text_x: text_x.normalize_or_zero(),
            text_y: text_y.normalize_or_zero(),
            x_dim,
            y_dim,
            width,
            height,
            pixels,
        })
    }

    /// Load the image from disk (any format the `image` crate decodes).
    pub fn load(
        path: &Path,
        text_x: DVec3,
        text_y: DVec3,
        x_dim: f64,
        y_dim: f64,
    ) -> TextureResult<Self> {
        let reader = image::io::Reader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| {
                TextureError::LoadError(format!("Failed to open {}: {}", path.display(), e))
            })?;
        let img = reader.decode()?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| {
                Color::new(
                    p[0] as f64 / 255.0,
                    p[1] as f64 / 255.0,
                    p[2] as f64 / 255.0,
                )
            })
            .collect();

        log::debug!("Loaded bitmap texture: {} ({}x{})", path.display(), width, height);

        Self::new(
            text_x,
            text_y,
            x_dim,
            y_dim,
            width as usize,
            height as usize,
            pixels,
        )
        .map_err(|e| match e {
            TextureError::EmptyImage(_) => TextureError::EmptyImage(path.display().to_string()),
            other => other,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn color_at(&self, x: f64, y: f64) -> Color {
        // Position inside the current period, in (-1, 1)
        let fx = (x - (x / self.x_dim).trunc() * self.x_dim) / self.x_dim;
        let fy = (y - (y / self.y_dim).trunc() * self.y_dim) / self.y_dim;

        let px = ((fx * self.width as f64).abs() as usize).min(self.width - 1);
        let from_bottom = (fy * self.height as f64).abs() as usize;
        let py = (self.height - 1).saturating_sub(from_bottom);

        self.pixels[py * self.width + px]
    }
}

fn check_dimensions(x_dim: f64, y_dim: f64) -> TextureResult<()> {
    if x_dim > 0.0 && y_dim > 0.0 {
        Ok(())
    } else {
        Err(TextureError::InvalidDimensions(x_dim, y_dim))
    }
}
