//! Shapes: geometry plus the optical behaviour photons and rays see on it.
//!
//! A shape is either a zero-thickness **surface** (plane, triangle) that lets
//! light through according to a transparency probability, or a closed
//! **volume** (sphere, parallelepiped) that refracts according to an index.
//! The geometry answers intersection queries; [`Shape`] layers the
//! probabilistic photon redirection and deterministic ray splitting on top.

mod parallelepiped;
mod plane;
mod sphere;
mod triangle;

pub use parallelepiped::Parallelepiped;
pub use plane::Plane;
pub use sphere::Sphere;
pub use triangle::Triangle;

use std::sync::OnceLock;

use lux_math::{Color, DVec3, Photon, Ray};
use rand::{Rng, RngCore};
use thiserror::Error;

use crate::texture::{Texture, TextureId};

/// Distance a redirected ray is pushed off the surface it left.
pub const NUDGE_EPSILON: f64 = 1e-6;

/// Below this `|d·n|` a ray is considered parallel to a plane.
pub(crate) const PARALLEL_EPSILON: f64 = 1e-7;

/// Smallest accepted length for spanning vectors and cross products.
pub(crate) const DEGENERATE_EPSILON: f64 = 1e-12;

/// Degenerate primitives rejected at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Sphere radius must be positive (got {0})")]
    NonPositiveRadius(f64),

    #[error("Normal vector has zero length")]
    ZeroNormal,

    #[error("Triangle vertices are collinear")]
    CollinearTriangle,

    #[error("Parallelepiped edge {0} has zero length")]
    ZeroEdge(char),

    #[error("Parallelepiped edges are coplanar")]
    FlatParallelepiped,

    #[error("Camera basis vectors are zero or parallel")]
    DegenerateCameraBasis,

    #[error("Camera extent must be positive (got {0} x {1})")]
    InvalidCameraExtent(f64, f64),

    #[error("Light direction has zero length")]
    ZeroLightDirection,
}

/// Index of a shape in the scene's shape list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub usize);

/// Where a ray meets a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: DVec3,
    /// Unit normal facing the incoming ray
    pub normal: DVec3,
    /// True when the ray arrives from outside (for volumes, entering)
    pub front_face: bool,
}

/// Orthonormal texture frame. Texture coordinates are measured along `x`
/// and `y`; what that means exactly depends on the primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: DVec3,
    pub y: DVec3,
}

impl Frame {
    /// Orthonormal pair built from optional hints; `y` is kept as given when
    /// present and `x` is made orthogonal to it.
    pub fn from_hints(hint_x: DVec3, hint_y: DVec3) -> Self {
        let x = hint_x.normalize_or_zero();
        let y = hint_y.normalize_or_zero();

        match (x == DVec3::ZERO, y == DVec3::ZERO) {
            (true, true) => Frame {
                x: DVec3::X,
                y: DVec3::Y,
            },
            (false, true) => Frame {
                x,
                y: x.any_orthonormal_vector(),
            },
            (true, false) => Frame {
                x: y.any_orthonormal_vector(),
                y,
            },
            (false, false) => {
                let x = (x - y * y.dot(x)).normalize_or_zero();
                let x = if x == DVec3::ZERO {
                    y.any_orthonormal_vector()
                } else {
                    x
                };
                Frame { x, y }
            }
        }
    }

    /// Orthonormal pair lying in the plane of `normal`, aligned with the
    /// hints as far as the plane allows.
    pub fn tangent(normal: DVec3, hint_x: DVec3, hint_y: DVec3) -> Self {
        let project = |v: DVec3| (v - normal * normal.dot(v)).normalize_or_zero();
        let x = project(hint_x);
        let y = project(hint_y);

        match (x == DVec3::ZERO, y == DVec3::ZERO) {
            (true, true) => {
                let x = normal.any_orthonormal_vector();
                Frame {
                    x,
                    y: normal.cross(x),
                }
            }
            (true, false) => Frame {
                x: y.cross(normal),
                y,
            },
            (false, _) => {
                let across = normal.cross(x);
                let y = if across.dot(y) >= 0.0 { across } else { -across };
                Frame { x, y }
            }
        }
    }
}

/// Intersection contract every primitive satisfies.
pub trait Primitive: Send + Sync {
    /// Nearest point where the ray meets the primitive, if any.
    fn nearest_intersection(&self, ray: &Ray) -> Option<Intersection>;

    fn intersects(&self, ray: &Ray) -> bool {
        self.nearest_intersection(ray).is_some()
    }

    /// Texture frame derived from the texture's orientation hints.
    fn texture_frame(&self, hint_x: DVec3, hint_y: DVec3) -> Frame;

    /// 2D texture coordinates of a point on the primitive.
    fn texture_coordinates(&self, frame: &Frame, point: DVec3) -> (f64, f64);
}

/// Closed primitives that can emit light from their boundary.
pub trait Solid: Primitive {
    /// Uniform point on the boundary and a random direction leaving it.
    fn random_point_and_direction(&self, rng: &mut dyn RngCore) -> (DVec3, DVec3);
}

#[derive(Debug, Clone)]
pub enum SurfaceGeometry {
    Plane(Plane),
    Triangle(Triangle),
}

#[derive(Debug, Clone)]
pub enum VolumeGeometry {
    Sphere(Sphere),
    Parallelepiped(Parallelepiped),
}

impl VolumeGeometry {
    pub fn as_solid(&self) -> &dyn Solid {
        match self {
            VolumeGeometry::Sphere(s) => s,
            VolumeGeometry::Parallelepiped(p) => p,
        }
    }
}

impl From<Plane> for SurfaceGeometry {
    fn from(plane: Plane) -> Self {
        SurfaceGeometry::Plane(plane)
    }
}

impl From<Triangle> for SurfaceGeometry {
    fn from(triangle: Triangle) -> Self {
        SurfaceGeometry::Triangle(triangle)
    }
}

impl From<Sphere> for VolumeGeometry {
    fn from(sphere: Sphere) -> Self {
        VolumeGeometry::Sphere(sphere)
    }
}

impl From<Parallelepiped> for VolumeGeometry {
    fn from(p: Parallelepiped) -> Self {
        VolumeGeometry::Parallelepiped(p)
    }
}

#[derive(Debug, Clone)]
pub enum ShapeKind {
    /// Zero thickness; transmitted light keeps its direction.
    Surface {
        geometry: SurfaceGeometry,
        transparency: f64,
    },
    /// Closed; transmitted light is refracted by `index`.
    Volume {
        geometry: VolumeGeometry,
        refraction: f64,
        index: f64,
    },
}

/// A renderable shape owned by the scene.
#[derive(Debug)]
pub struct Shape {
    kind: ShapeKind,
    absorption: f64,
    reflection: f64,
    texture: TextureId,
    frame: OnceLock<Frame>,
}

impl Shape {
    pub fn surface(
        geometry: impl Into<SurfaceGeometry>,
        absorption: f64,
        reflection: f64,
        transparency: f64,
        texture: TextureId,
    ) -> Self {
        Self {
            kind: ShapeKind::Surface {
                geometry: geometry.into(),
                transparency,
            },
            absorption,
            reflection,
            texture,
            frame: OnceLock::new(),
        }
    }

    pub fn volume(
        geometry: impl Into<VolumeGeometry>,
        absorption: f64,
        reflection: f64,
        refraction: f64,
        index: f64,
        texture: TextureId,
    ) -> Self {
        Self {
            kind: ShapeKind::Volume {
                geometry: geometry.into(),
                refraction,
                index,
            },
            absorption,
            reflection,
            texture,
            frame: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn absorption(&self) -> f64 {
        self.absorption
    }

    pub fn reflection(&self) -> f64 {
        self.reflection
    }

    /// Transparency for surfaces, refraction probability for volumes.
    pub fn transmission(&self) -> f64 {
        match &self.kind {
            ShapeKind::Surface { transparency, .. } => *transparency,
            ShapeKind::Volume { refraction, .. } => *refraction,
        }
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn as_volume(&self) -> Option<&VolumeGeometry> {
        match &self.kind {
            ShapeKind::Volume { geometry, .. } => Some(geometry),
            ShapeKind::Surface { .. } => None,
        }
    }

    fn primitive(&self) -> &dyn Primitive {
        match &self.kind {
            ShapeKind::Surface { geometry, .. } => match geometry {
                SurfaceGeometry::Plane(p) => p,
                SurfaceGeometry::Triangle(t) => t,
            },
            ShapeKind::Volume { geometry, .. } => match geometry {
                VolumeGeometry::Sphere(s) => s,
                VolumeGeometry::Parallelepiped(p) => p,
            },
        }
    }

    pub fn intersects(&self, ray: &Ray) -> bool {
        self.primitive().intersects(ray)
    }

    pub fn nearest_intersection(&self, ray: &Ray) -> Option<Intersection> {
        self.primitive().nearest_intersection(ray)
    }

    /// Index ratio (left / entered) for a ray crossing at `hit`.
    fn transmission_ratio(&self, hit: &Intersection) -> f64 {
        match &self.kind {
            ShapeKind::Surface { .. } => 1.0,
            ShapeKind::Volume { index, .. } => {
                if hit.front_face {
                    1.0 / index
                } else {
                    *index
                }
            }
        }
    }

    /// Surface color at a point of the shape.
    ///
    /// `texture` must be the texture this shape refers to. Procedural
    /// textures fix the shape's frame on first use.
    pub fn local_color(&self, point: DVec3, texture: &Texture) -> Color {
        if !texture.is_procedural() {
            return texture.color_at(0.0, 0.0);
        }
        let primitive = self.primitive();
        let frame = self.frame.get_or_init(|| {
            let (hint_x, hint_y) = texture.orientation();
            primitive.texture_frame(hint_x, hint_y)
        });
        let (x, y) = primitive.texture_coordinates(frame, point);
        texture.color_at(x, y)
    }

    /// Russian-roulette the photon at `hit`.
    ///
    /// Returns `true` when the photon was reflected or transmitted and keeps
    /// travelling (its color filtered by the surface), `false` when it was
    /// absorbed, in which case it rests on the intersection point.
    pub fn redirect_photon(
        &self,
        hit: &Intersection,
        photon: &mut Photon,
        texture: &Texture,
        rng: &mut dyn RngCore,
    ) -> bool {
        let sample: f64 = rng.gen();

        let direction = if sample < self.reflection {
            photon.ray().reflected(hit.normal)
        } else if sample < self.reflection + self.transmission() {
            photon
                .ray()
                .refracted(hit.normal, self.transmission_ratio(hit))
        } else {
            photon.ray_mut().set_origin(hit.point);
            return false;
        };

        let ray = photon.ray_mut();
        ray.set_origin(hit.point);
        ray.set_direction(direction);
        ray.advance(NUDGE_EPSILON);

        let filtered = photon.color() * self.local_color(hit.point, texture);
        photon.set_color(filtered);
        true
    }

    /// Split a camera ray at `hit` into its reflected and transmitted parts.
    ///
    /// A part whose probability is zero comes back as [`Ray::NONE`]; so does
    /// the transmitted part when it coincides with the reflected one (total
    /// internal reflection).
    pub fn divide_ray(&self, hit: &Intersection, ray: &Ray) -> (Ray, Ray) {
        let spawn = |direction: DVec3| {
            let mut spawned = Ray::new(hit.point, direction);
            spawned.advance(NUDGE_EPSILON);
            spawned
        };

        let reflected = if self.reflection == 0.0 {
            Ray::NONE
        } else {
            spawn(ray.reflected(hit.normal))
        };

        let mut refracted = if self.transmission() == 0.0 {
            Ray::NONE
        } else {
            spawn(ray.refracted(hit.normal, self.transmission_ratio(hit)))
        };
        if !refracted.is_none() && refracted.direction() == reflected.direction() {
            refracted.set_direction(DVec3::ZERO);
        }

        (reflected, refracted)
    }
}

/// Plane crossing shared by every flat primitive.
///
/// The ray must approach the plane (not run parallel to it nor move
/// away from it); the reported normal faces the ray's side.
pub(crate) fn plane_crossing(ray: &Ray, anchor: DVec3, normal: DVec3) -> Option<Intersection> {
    let start = ray.origin();
    let dir = ray.direction();

    let d_dot_n = dir.dot(normal);
    if d_dot_n.abs() < PARALLEL_EPSILON {
        return None;
    }

    let to_start = normal * normal.dot(start - anchor);
    let distance = to_start.length();
    if distance < DEGENERATE_EPSILON {
        return None;
    }
    let facing = to_start / distance;
    if dir.dot(facing) >= 0.0 {
        return None;
    }

    Some(Intersection {
        point: start + dir * (distance / d_dot_n.abs()),
        normal: facing,
        front_face: d_dot_n < 0.0,
    })
}

/// Whether `x` lies on the same side of the line (p0, p1) as `opposite`.
pub(crate) fn inside_edge(x: DVec3, p0: DVec3, p1: DVec3, opposite: DVec3) -> bool {
    let edge = (p1 - p0).normalize_or_zero();
    let rel = x - p0;
    let perp = rel - edge * edge.dot(rel);
    perp.dot(opposite - p0) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const WHITE: TextureId = TextureId(0);

    fn white() -> Texture {
        Texture::Colored(Color::ONE)
    }

    fn floor(absorption: f64, reflection: f64, transparency: f64) -> Shape {
        let plane = Plane::new(DVec3::ZERO, DVec3::Z).unwrap();
        Shape::surface(plane, absorption, reflection, transparency, WHITE)
    }

    fn glass_ball() -> Shape {
        let sphere = Sphere::new(DVec3::ZERO, 1.0).unwrap();
        Shape::volume(sphere, 0.0, 0.1, 0.9, 1.5, WHITE)
    }

    #[test]
    fn test_redirect_branch_frequencies() {
        let shape = floor(0.5, 0.3, 0.2);
        let texture = white();
        let mut rng = StdRng::seed_from_u64(2024);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 1.0), -DVec3::Z);
        let hit = shape.nearest_intersection(&ray).unwrap();

        let trials = 100_000;
        let (mut reflected, mut transmitted, mut absorbed) = (0, 0, 0);
        for _ in 0..trials {
            let mut photon = Photon::new(ray.origin(), ray.direction(), Color::ONE);
            if !shape.redirect_photon(&hit, &mut photon, &texture, &mut rng) {
                absorbed += 1;
            } else if photon.direction().z > 0.0 {
                reflected += 1;
            } else {
                transmitted += 1;
            }
        }

        let freq = |n: i32| n as f64 / trials as f64;
        assert!((freq(reflected) - 0.3).abs() < 0.01);
        assert!((freq(transmitted) - 0.2).abs() < 0.01);
        assert!((freq(absorbed) - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_absorbed_photon_rests_on_the_hit() {
        let shape = floor(1.0, 0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(DVec3::new(0.5, 0.5, 2.0), -DVec3::Z);
        let hit = shape.nearest_intersection(&ray).unwrap();
        let mut photon = Photon::new(ray.origin(), ray.direction(), Color::ONE);

        assert!(!shape.redirect_photon(&hit, &mut photon, &white(), &mut rng));
        assert_eq!(photon.origin(), DVec3::new(0.5, 0.5, 0.0));
        assert_eq!(photon.color(), Color::ONE);
    }

    #[test]
    fn test_reflected_photon_is_filtered_and_nudged() {
        let shape = floor(0.0, 1.0, 0.0);
        let texture = Texture::Colored(Color::new(0.5, 1.0, 0.25));
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 1.0), DVec3::new(1.0, 0.0, -1.0));
        let hit = shape.nearest_intersection(&ray).unwrap();
        let mut photon = Photon::new(ray.origin(), ray.direction(), Color::ONE);

        assert!(shape.redirect_photon(&hit, &mut photon, &texture, &mut rng));
        assert_eq!(photon.color(), Color::new(0.5, 1.0, 0.25));
        assert!(photon.direction().z > 0.0);
        assert!(photon.origin().z > 0.0);
        assert!((photon.origin() - hit.point).length() < 1e-5);
    }

    #[test]
    fn test_divide_ray_zero_probabilities_give_sentinels() {
        let opaque = floor(1.0, 0.0, 0.0);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 1.0), -DVec3::Z);
        let hit = opaque.nearest_intersection(&ray).unwrap();

        let (reflected, refracted) = opaque.divide_ray(&hit, &ray);
        assert!(reflected.is_none());
        assert!(refracted.is_none());
    }

    #[test]
    fn test_divide_ray_through_transparent_surface() {
        let window = floor(0.0, 0.5, 0.5);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 1.0), DVec3::new(1.0, 0.0, -1.0));
        let hit = window.nearest_intersection(&ray).unwrap();

        let (reflected, refracted) = window.divide_ray(&hit, &ray);
        assert!(reflected.direction().z > 0.0);
        assert!((refracted.direction() - ray.direction()).length() < 1e-12);
        assert!(refracted.origin().z < 0.0);
    }

    #[test]
    fn test_divide_ray_total_internal_reflection_drops_refracted() {
        let ball = glass_ball();
        // Start inside, head for the boundary at a grazing angle
        let ray = Ray::new(DVec3::new(0.0, 0.9, 0.0), DVec3::new(1.0, 0.2, 0.0));
        let hit = ball.nearest_intersection(&ray).unwrap();
        assert!(!hit.front_face);

        let (reflected, refracted) = ball.divide_ray(&hit, &ray);
        assert!(!reflected.is_none());
        assert!(refracted.is_none());
    }

    #[test]
    fn test_volume_ratio_depends_on_side() {
        let ball = glass_ball();
        let outside = Ray::new(DVec3::new(-5.0, 0.3, 0.0), DVec3::X);
        let inside = Ray::new(DVec3::new(0.0, 0.3, 0.0), DVec3::X);

        let entering = ball.nearest_intersection(&outside).unwrap();
        let leaving = ball.nearest_intersection(&inside).unwrap();

        assert!(entering.front_face);
        assert!(!leaving.front_face);
        assert_eq!(ball.transmission_ratio(&entering), 1.0 / 1.5);
        assert_eq!(ball.transmission_ratio(&leaving), 1.5);
    }

    #[test]
    fn test_procedural_frame_is_fixed_once() {
        let plane = Plane::new(DVec3::ZERO, DVec3::Z).unwrap();
        let shape = Shape::surface(plane, 1.0, 0.0, 0.0, WHITE);
        let checkers = crate::texture::Checkers::new(
            DVec3::X,
            DVec3::Y,
            1.0,
            1.0,
            Color::ONE,
            Color::ZERO,
        )
        .unwrap();
        let texture = Texture::Checkers(checkers);

        assert_eq!(shape.local_color(DVec3::new(0.5, 0.5, 0.0), &texture), Color::ONE);
        assert_eq!(shape.local_color(DVec3::new(1.5, 0.5, 0.0), &texture), Color::ZERO);
        assert_eq!(shape.frame.get().map(|f| f.x), Some(DVec3::X));
    }

    #[test]
    fn test_tangent_frame_is_orthonormal() {
        let normal = DVec3::new(1.0, 1.0, 1.0).normalize();
        for (hx, hy) in [
            (DVec3::ZERO, DVec3::ZERO),
            (DVec3::X, DVec3::ZERO),
            (DVec3::ZERO, DVec3::Y),
            (DVec3::X, DVec3::Y),
            (normal, normal),
        ] {
            let frame = Frame::tangent(normal, hx, hy);
            assert!((frame.x.length() - 1.0).abs() < 1e-9);
            assert!((frame.y.length() - 1.0).abs() < 1e-9);
            assert!(frame.x.dot(frame.y).abs() < 1e-9);
            assert!(frame.x.dot(normal).abs() < 1e-9);
            assert!(frame.y.dot(normal).abs() < 1e-9);
        }
    }

    #[test]
    fn test_frame_from_hints_keeps_y() {
        let frame = Frame::from_hints(DVec3::new(1.0, 1.0, 0.0), DVec3::Z);
        assert_eq!(frame.y, DVec3::Z);
        assert!(frame.x.dot(frame.y).abs() < 1e-12);
        assert!((frame.x.length() - 1.0).abs() < 1e-12);
    }
}
