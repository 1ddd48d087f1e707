//! Image renderers: the photon-mapped render and the photon splat preview.

use std::time::Instant;

use lux_core::{RenderConfig, Scene};
use lux_math::Color;
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
use crate::image::{ImageBuffer, ImageError};
use crate::integrator::Integrator;
use crate::photon_map::PhotonMap;

/// Render the scene using the photon map for diffuse lighting.
///
/// With supersampling the image is rendered at a multiple of the configured
/// size and box filtered down. The first global light tints the result.
pub fn render(
    scene: &Scene,
    photon_map: &PhotonMap,
    config: &RenderConfig,
) -> Result<ImageBuffer, ImageError> {
    let start = Instant::now();
    let factor = config.supersampling_factor();
    let width = config.width * factor;
    let height = config.height * factor;

    let integrator = Integrator::new(scene, photon_map, config);
    let buckets = generate_buckets(width, height, config.bucket_size);
    log::info!(
        "Rendering {}x{} in {} buckets (depth {}, {} photons per estimate)",
        width,
        height,
        buckets.len(),
        config.raytracer_depth,
        config.photons_to_find
    );

    let shade = |bucket: &Bucket| {
        let result = BucketResult::new(*bucket, render_bucket(bucket, &integrator, width, height));
        log::debug!("Bucket {} done", bucket.index);
        result
    };
    let results: Vec<BucketResult> = if config.parallel {
        buckets.par_iter().map(shade).collect()
    } else {
        buckets.iter().map(shade).collect()
    };

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        let bucket = result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let x = bucket.x + i as u32 % bucket.width;
            let y = bucket.y + i as u32 / bucket.width;
            image.set(x, y, *color);
        }
    }

    if let Some(tint) = scene.global_tint() {
        log::debug!("Applying global tint {:?}", tint);
        image.scale(tint);
    }

    if factor > 1 {
        log::debug!("Downsampling by {}", factor);
        image = image.downsample(factor)?;
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}

/// Splat every stored photon the camera can see as a white pixel.
pub fn render_photonmap(scene: &Scene, photon_map: &PhotonMap, config: &RenderConfig) -> ImageBuffer {
    let (width, height) = (config.width, config.height);
    let mut image = ImageBuffer::new(width, height);
    if width == 0 || height == 0 {
        return image;
    }

    let camera = scene.camera();
    let mut visible = 0usize;
    for photon in photon_map.photons() {
        let Some((u, v)) = camera.can_see(photon.origin()) else {
            continue;
        };
        let x = ((u * width as f64) as u32).min(width - 1);
        let y = (((1.0 - v) * height as f64) as u32).min(height - 1);
        image.set(x, y, Color::ONE);
        visible += 1;
    }

    log::info!(
        "Photon map preview: {} of {} photons in frame",
        visible,
        photon_map.len()
    );
    image
}
