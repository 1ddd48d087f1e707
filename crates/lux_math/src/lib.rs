//! Lux math - vector algebra and rays for the photon mapper.
//!
//! Everything is double precision: the optics and intersection code compare
//! against tolerances around `1e-9`, which single precision cannot honour.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
pub mod optics;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::{Photon, Ray};

/// Color type alias (linear RGB, not clamped until written to an image)
pub type Color = DVec3;
