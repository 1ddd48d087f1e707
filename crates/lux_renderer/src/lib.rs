//! Lux Renderer - CPU photon mapping.
//!
//! Two passes over a [`lux_core::Scene`]:
//!
//! 1. [`build_photon_map`] traces photons from every radiant light and
//!    indexes the absorbed ones in a kd-tree.
//! 2. [`render`] shoots camera rays, estimating diffuse light from the
//!    nearest photons and recursing through reflections and refractions.
//!
//! [`render_photonmap`] splats the stored photons for a quick preview.

mod bucket;
pub mod image;
mod integrator;
mod photon_map;
mod renderer;
mod transport;

pub use self::image::{ImageBuffer, ImageError};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use integrator::Integrator;
pub use photon_map::PhotonMap;
pub use renderer::{render, render_photonmap};
pub use transport::build_photon_map;

/// Re-export the scene model and math types
pub use lux_core::{RenderConfig, Scene};
pub use lux_math::{Color, DVec3, Photon, Ray};
