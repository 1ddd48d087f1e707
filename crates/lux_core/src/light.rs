//! Light sources.
//!
//! Every light has a color and a power. Punctual, hemispherical and
//! radiant-volume lights emit photons; the global light emits nothing and
//! only tints the final image.

use lux_math::{Color, DVec3, Photon, Ray};
use rand::RngCore;

use crate::sampling::{random_in_hemisphere, random_unit_vector};
use crate::shape::{Shape, ShapeId, NUDGE_EPSILON};

/// Hits closer than this to the target point count as the target itself.
const SHADOW_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub enum Light {
    /// Point source radiating in every direction.
    Punctual {
        color: Color,
        power: f64,
        origin: DVec3,
    },
    /// Point source radiating into the half-space around `direction`.
    Hemispherical {
        color: Color,
        power: f64,
        origin: DVec3,
        direction: DVec3,
    },
    /// Ambient term multiplied into the whole image.
    Global { color: Color, power: f64 },
    /// A volume of the scene glowing from its boundary.
    RadiantVolume {
        color: Color,
        power: f64,
        volume: ShapeId,
    },
}

impl Light {
    pub fn punctual(color: Color, power: f64, origin: DVec3) -> Self {
        Light::Punctual {
            color,
            power,
            origin,
        }
    }

    pub fn hemispherical(color: Color, power: f64, origin: DVec3, direction: DVec3) -> Self {
        Light::Hemispherical {
            color,
            power,
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn global(color: Color, power: f64) -> Self {
        Light::Global { color, power }
    }

    pub fn radiant_volume(color: Color, power: f64, volume: ShapeId) -> Self {
        Light::RadiantVolume {
            color,
            power,
            volume,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Punctual { color, .. }
            | Light::Hemispherical { color, .. }
            | Light::Global { color, .. }
            | Light::RadiantVolume { color, .. } => *color,
        }
    }

    pub fn power(&self) -> f64 {
        match self {
            Light::Punctual { power, .. }
            | Light::Hemispherical { power, .. }
            | Light::Global { power, .. }
            | Light::RadiantVolume { power, .. } => *power,
        }
    }

    /// Whether this light takes part in photon emission.
    pub fn is_radiant(&self) -> bool {
        !matches!(self, Light::Global { .. })
    }

    /// Position of a point-like (coherent) source.
    pub fn origin(&self) -> Option<DVec3> {
        match self {
            Light::Punctual { origin, .. } | Light::Hemispherical { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    /// `power × color` for the global light.
    pub fn tint(&self) -> Option<Color> {
        match self {
            Light::Global { color, power } => Some(*color * *power),
            _ => None,
        }
    }

    /// Emit one photon carrying the light's color (not yet scaled by power).
    ///
    /// Returns `None` for the global light, and for a radiant volume whose
    /// shape is missing or not a volume (rejected when the scene is built).
    pub fn random_photon(&self, shapes: &[Shape], rng: &mut dyn RngCore) -> Option<Photon> {
        match self {
            Light::Punctual { color, origin, .. } => {
                Some(Photon::new(*origin, random_unit_vector(rng), *color))
            }
            Light::Hemispherical {
                color,
                origin,
                direction,
                ..
            } => Some(Photon::new(
                *origin,
                random_in_hemisphere(*direction, rng),
                *color,
            )),
            Light::RadiantVolume { color, volume, .. } => {
                let solid = shapes.get(volume.0)?.as_volume()?.as_solid();
                let (point, direction) = solid.random_point_and_direction(rng);
                let mut photon = Photon::new(point, direction, *color);
                photon.ray_mut().advance(NUDGE_EPSILON);
                Some(photon)
            }
            Light::Global { .. } => None,
        }
    }

    /// Shadow test for coherent sources: nothing stands strictly between the
    /// source and `point`. Always `false` for other lights.
    pub fn is_viewable_from(&self, point: DVec3, shapes: &[Shape]) -> bool {
        let origin = match self {
            Light::Punctual { origin, .. } => *origin,
            Light::Hemispherical {
                origin, direction, ..
            } => {
                if (point - *origin).dot(*direction) <= 0.0 {
                    return false;
                }
                *origin
            }
            _ => return false,
        };

        let target = point - origin;
        let distance = target.length();
        if distance < SHADOW_EPSILON {
            return true;
        }

        let shadow_ray = Ray::new(origin, target);
        !shapes.iter().any(|shape| {
            shape
                .nearest_intersection(&shadow_ray)
                .is_some_and(|hit| (hit.point - origin).length() < distance - SHADOW_EPSILON)
        })
    }
}
