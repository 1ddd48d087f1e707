use crate::{optics, Color, DVec3};

/// A ray: a current position and a current direction.
///
/// The direction is always either unit length or exactly zero. A zero
/// direction is the "no ray" sentinel that shapes hand back when they cannot
/// spawn a secondary ray (see [`Ray::NONE`]).
///
/// Unlike a textbook ray the origin moves: photons are bounced in place, so
/// the origin is the ray's *current* position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: DVec3,
    direction: DVec3,
}

impl Ray {
    /// The sentinel ray with a zero direction.
    pub const NONE: Ray = Ray {
        origin: DVec3::ZERO,
        direction: DVec3::ZERO,
    };

    /// Create a new ray. Non-zero directions are normalized.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get the current position of the ray.
    #[inline]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Get the direction of the ray (unit length or zero).
    #[inline]
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// True for the zero-direction sentinel.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.direction == DVec3::ZERO
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// Move the ray to a new position.
    pub fn set_origin(&mut self, origin: DVec3) {
        self.origin = origin;
    }

    /// Point the ray in a new direction (normalized, or zero).
    pub fn set_direction(&mut self, direction: DVec3) {
        self.direction = direction.normalize_or_zero();
    }

    /// Nudge the origin along the current direction.
    pub fn advance(&mut self, distance: f64) {
        self.origin += self.direction * distance;
    }

    /// Direction after a mirror bounce on a surface with the given normal.
    pub fn reflected(&self, normal: DVec3) -> DVec3 {
        optics::reflect(self.direction, normal.normalize_or_zero())
    }

    /// Direction after crossing an interface with the given index ratio.
    pub fn refracted(&self, normal: DVec3, ratio: f64) -> DVec3 {
        optics::refract(self.direction, normal.normalize_or_zero(), ratio)
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::NONE
    }
}

/// A ray carrying flux through the scene during photon transport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Photon {
    ray: Ray,
    color: Color,
}

impl Photon {
    /// Create a new photon.
    pub fn new(origin: DVec3, direction: DVec3, color: Color) -> Self {
        Self {
            ray: Ray::new(origin, direction),
            color,
        }
    }

    /// The photon's ray part.
    #[inline]
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Mutable access used while bouncing the photon.
    #[inline]
    pub fn ray_mut(&mut self) -> &mut Ray {
        &mut self.ray
    }

    #[inline]
    pub fn origin(&self) -> DVec3 {
        self.ray.origin()
    }

    #[inline]
    pub fn direction(&self) -> DVec3 {
        self.ray.direction()
    }

    /// Flux currently carried by the photon.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
