//! Render configuration shared by photon transport and the integrator.

use serde::Deserialize;

/// Render configuration.
///
/// Read from the `parameters` section of a scene description; every field
/// is optional there and falls back to the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Render at twice the resolution and box filter down
    pub supersampling: bool,
    /// Total photon budget, split across radiant sources
    pub max_photons: usize,
    /// Photons gathered per density estimate
    pub photons_to_find: usize,
    /// Maximum bounces per photon before it is discarded
    pub photon_depth: u32,
    /// Camera-ray recursion depth
    pub raytracer_depth: u32,
    /// Base seed of the per-photon generators
    pub seed: u64,
    /// Run photon transport and rendering on the rayon pool
    pub parallel: bool,
    /// Add direct illumination from point and hemispherical sources
    pub direct_lighting: bool,
    /// Render tile size in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            supersampling: false,
            max_photons: 10_000,
            photons_to_find: 100,
            photon_depth: 20,
            raytracer_depth: 3,
            seed: 0,
            parallel: true,
            direct_lighting: false,
            bucket_size: 64,
        }
    }
}

impl RenderConfig {
    /// Factor applied to each image dimension while rendering.
    pub fn supersampling_factor(&self) -> u32 {
        if self.supersampling {
            2
        } else {
            1
        }
    }

    /// Set the output resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the photon budget and gather size.
    pub fn with_photons(mut self, max_photons: usize, photons_to_find: usize) -> Self {
        self.max_photons = max_photons;
        self.photons_to_find = photons_to_find;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert!(!config.supersampling);
        assert_eq!(config.max_photons, 10_000);
        assert_eq!(config.photons_to_find, 100);
        assert_eq!(config.photon_depth, 20);
        assert_eq!(config.raytracer_depth, 3);
        assert_eq!(config.supersampling_factor(), 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "width": 64, "supersampling": true }"#).unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 600);
        assert_eq!(config.supersampling_factor(), 2);
        assert!(config.parallel);
    }
}
