//! Radiance estimate along camera rays.
//!
//! Diffuse light comes from a density estimate over the photon map; the
//! reflected and transmitted parts are traced recursively up to the
//! configured depth and weighted by the shape's probabilities.

use lux_core::{RenderConfig, Scene};
use lux_math::{Color, DVec3, Ray};

use crate::photon_map::PhotonMap;

/// Squared gather radii below this give no diffuse contribution.
const MIN_GATHER_RADIUS2: f64 = 1e-12;

/// Shades camera rays against a scene and its photon map.
pub struct Integrator<'a> {
    scene: &'a Scene,
    photon_map: &'a PhotonMap,
    config: &'a RenderConfig,
}

impl<'a> Integrator<'a> {
    pub fn new(scene: &'a Scene, photon_map: &'a PhotonMap, config: &'a RenderConfig) -> Self {
        Self {
            scene,
            photon_map,
            config,
        }
    }

    /// Color seen by the camera at normalized image coordinates.
    pub fn pixel_color(&self, u: f64, v: f64) -> Color {
        let ray = self.scene.camera().get_ray(u, v);
        self.local_color(&ray, self.config.raytracer_depth)
    }

    /// Color seen along `ray`, recursing at most `depth` times.
    pub fn local_color(&self, ray: &Ray, depth: u32) -> Color {
        let Some((shape, hit)) = self.scene.nearest_intersection(ray) else {
            return Color::ZERO;
        };

        let surface = self.scene.local_color(shape, hit.point);
        let mut diffuse = self.diffuse(hit.point, surface);
        if self.config.direct_lighting {
            diffuse += self.direct(hit.point, surface);
        }

        if depth == 0 {
            return diffuse;
        }

        let (reflected, refracted) = shape.divide_ray(&hit, ray);
        self.trace(&reflected, depth - 1) * shape.reflection()
            + self.trace(&refracted, depth - 1) * shape.transmission().max(0.0)
            + diffuse * shape.absorption()
    }

    fn trace(&self, ray: &Ray, depth: u32) -> Color {
        if ray.is_none() {
            Color::ZERO
        } else {
            self.local_color(ray, depth)
        }
    }

    /// Photon density estimate at `point`.
    fn diffuse(&self, point: DVec3, surface: Color) -> Color {
        let photons = self
            .photon_map
            .k_nearest(point, self.config.photons_to_find);

        // Nearest first, except for k = 0 which gives storage order
        let radius2 = photons
            .iter()
            .map(|p| (p.origin() - point).length_squared())
            .fold(0.0, f64::max);
        if photons.is_empty() || radius2 < MIN_GATHER_RADIUS2 {
            return Color::ZERO;
        }

        let flux: Color = photons.iter().map(|p| p.color()).sum();
        let weight = 1.0 / self.config.max_photons as f64;
        flux * (weight / radius2) * surface
    }

    /// Direct light from the point and hemispherical sources that see `point`.
    fn direct(&self, point: DVec3, surface: Color) -> Color {
        let shapes = self.scene.shapes();
        let incoming: Color = self
            .scene
            .coherent_lights()
            .filter(|light| light.is_viewable_from(point, shapes))
            .filter_map(|light| {
                let dist2 = (light.origin()? - point).length_squared();
                (dist2 > MIN_GATHER_RADIUS2).then(|| light.color() * (light.power() / dist2))
            })
            .sum();
        incoming * surface
    }
}
