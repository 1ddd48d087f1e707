//! Photon transport: emit photons from every radiant light, bounce them
//! through the scene and keep the ones that end up absorbed.
//!
//! Each photon draws from its own generator seeded by
//! `(seed, light index, photon index)`, so the parallel and sequential
//! builds produce the same photons in the same order.

use lux_core::{Light, RenderConfig, Scene};
use lux_math::{Color, Photon};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::photon_map::PhotonMap;

/// Photons traced per work item.
const TILE_SIZE: usize = 256;

/// A contiguous run of photon indices of one light.
#[derive(Debug, Clone, Copy)]
struct Tile {
    light: usize,
    start: usize,
    end: usize,
}

/// Trace `config.max_photons` photons and index the absorbed ones.
pub fn build_photon_map(scene: &Scene, config: &RenderConfig) -> PhotonMap {
    let radiant: Vec<(usize, &Light)> = scene.radiant_lights().collect();
    if radiant.is_empty() || config.max_photons == 0 {
        log::warn!("No photons to emit: the photon map is empty");
        return PhotonMap::new(Vec::new());
    }

    let quota = config.max_photons / radiant.len();
    log::info!(
        "Emitting {} photons from each of {} radiant lights",
        quota,
        radiant.len()
    );

    let tiles: Vec<Tile> = radiant
        .iter()
        .flat_map(|&(light, _)| {
            (0..quota).step_by(TILE_SIZE).map(move |start| Tile {
                light,
                start,
                end: (start + TILE_SIZE).min(quota),
            })
        })
        .collect();

    let trace = |tile: &Tile| trace_tile(scene, config, *tile);
    let photons: Vec<Photon> = if config.parallel {
        tiles.par_iter().flat_map_iter(trace).collect()
    } else {
        tiles.iter().flat_map(trace).collect()
    };

    log::info!(
        "{} of {} photons stored",
        photons.len(),
        quota * radiant.len()
    );
    PhotonMap::new(photons)
}

fn trace_tile(scene: &Scene, config: &RenderConfig, tile: Tile) -> Vec<Photon> {
    let mut stored = Vec::new();
    let Some(light) = scene.lights().get(tile.light) else {
        return stored;
    };
    for index in tile.start..tile.end {
        let mut rng = StdRng::seed_from_u64(photon_seed(config.seed, tile.light, index));
        trace_photon(scene, light, config.photon_depth, &mut rng, &mut stored);
    }
    stored
}

/// Follow one photon until it is absorbed, lost or out of bounces.
fn trace_photon(
    scene: &Scene,
    light: &Light,
    depth: u32,
    rng: &mut StdRng,
    stored: &mut Vec<Photon>,
) {
    let Some(mut photon) = light.random_photon(scene.shapes(), rng) else {
        return;
    };
    let power = light.power();

    if let Light::RadiantVolume { .. } = light {
        let mut emitted = photon;
        emitted.set_color(photon.color() * power);
        store(stored, emitted);
    }

    for _ in 0..depth {
        // Nothing left to carry
        if photon.color() == Color::ZERO {
            return;
        }
        let Some((shape, hit)) = scene.nearest_intersection(photon.ray()) else {
            return;
        };
        let texture = scene.texture_of(shape);
        if !shape.redirect_photon(&hit, &mut photon, texture, rng) {
            photon.set_color(photon.color() * power);
            store(stored, photon);
            return;
        }
    }
}

/// Black photons carry no flux and would only shrink the gather radius.
fn store(stored: &mut Vec<Photon>, photon: Photon) {
    if photon.color() != Color::ZERO {
        stored.push(photon);
    }
}

/// Per-photon generator seed.
fn photon_seed(seed: u64, light: usize, photon: usize) -> u64 {
    [light as u64, photon as u64]
        .into_iter()
        .fold(splitmix64(seed), |acc, value| splitmix64(acc ^ value))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
