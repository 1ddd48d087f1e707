//! Sphere primitive.

use lux_math::{DVec3, Ray};
use rand::RngCore;

use super::{Frame, GeometryError, Intersection, Primitive, Solid, DEGENERATE_EPSILON};
use crate::sampling::{random_in_hemisphere, random_unit_vector};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: DVec3,
    radius: f64,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: DVec3, radius: f64) -> Result<Self, GeometryError> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn contains(&self, point: DVec3) -> bool {
        (point - self.center).length_squared() < self.radius * self.radius
    }
}

impl Primitive for Sphere {
    fn nearest_intersection(&self, ray: &Ray) -> Option<Intersection> {
        if ray.is_none() {
            return None;
        }
        let start = ray.origin();
        let dir = ray.direction();
        let r2 = self.radius * self.radius;
        let inside = self.contains(start);

        // Foot of the perpendicular from the center onto the line
        let center_proj = start + dir * dir.dot(self.center - start);
        let offset2 = (self.center - center_proj).length_squared();

        if !inside && (offset2 > r2 || (center_proj - start).dot(dir) <= 0.0) {
            return None;
        }

        let half_chord = (r2 - offset2).max(0.0).sqrt();
        let forward = center_proj + dir * half_chord;
        let backward = center_proj - dir * half_chord;

        if inside {
            Some(Intersection {
                point: forward,
                normal: -(forward - self.center) / self.radius,
                front_face: false,
            })
        } else {
            let nearest = if (forward - start).length_squared() > (backward - start).length_squared() {
                backward
            } else {
                forward
            };
            Some(Intersection {
                point: nearest,
                normal: (nearest - self.center) / self.radius,
                front_face: true,
            })
        }
    }

    fn intersects(&self, ray: &Ray) -> bool {
        if ray.is_none() {
            return false;
        }
        if self.contains(ray.origin()) {
            return true;
        }
        let start = ray.origin();
        let dir = ray.direction();
        let center_proj = start + dir * dir.dot(self.center - start);

        (self.center - center_proj).length_squared() <= self.radius * self.radius
            && (center_proj - start).dot(dir) > 0.0
    }

    /// `y` is the pole, `x` the zero meridian.
    fn texture_frame(&self, hint_x: DVec3, hint_y: DVec3) -> Frame {
        Frame::from_hints(hint_x, hint_y)
    }

    /// Arc lengths: from the pole, then around it from the zero meridian.
    fn texture_coordinates(&self, frame: &Frame, point: DVec3) -> (f64, f64) {
        let radial = (point - self.center).normalize_or_zero();
        let polar_cos = frame.y.dot(radial);
        if polar_cos.abs() >= 1.0 - DEGENERATE_EPSILON {
            return (0.0, 0.0);
        }
        let x = polar_cos.clamp(-1.0, 1.0).acos() * self.radius;

        let around = (radial - frame.y * polar_cos).normalize_or_zero();
        let y = frame.x.dot(around).clamp(-1.0, 1.0).acos() * self.radius;

        (x, y)
    }
}

impl Solid for Sphere {
    fn random_point_and_direction(&self, rng: &mut dyn RngCore) -> (DVec3, DVec3) {
        let outward = random_unit_vector(rng);
        let point = self.center + outward * self.radius;
        (point, random_in_hemisphere(outward, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_sphere() -> Sphere {
        Sphere::new(DVec3::ZERO, 1.0).unwrap()
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = unit_sphere();
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), -DVec3::Z);

        assert!(sphere.intersects(&ray));
        let hit = sphere.nearest_intersection(&ray).unwrap();
        assert!((hit.point - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
        assert!((hit.normal - DVec3::Z).length() < 1e-12);
        assert!(hit.front_face);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere();

        let beside = Ray::new(DVec3::new(0.0, 2.0, 5.0), -DVec3::Z);
        assert!(!sphere.intersects(&beside));
        assert!(sphere.nearest_intersection(&beside).is_none());

        let away = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::Z);
        assert!(!sphere.intersects(&away));
        assert!(sphere.nearest_intersection(&away).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_faces_inward() {
        let sphere = Sphere::new(DVec3::new(1.0, 0.0, 0.0), 2.0).unwrap();
        let ray = Ray::new(DVec3::new(1.0, 0.0, 0.0), DVec3::Y);

        assert!(sphere.intersects(&ray));
        let hit = sphere.nearest_intersection(&ray).unwrap();
        assert!((hit.point - DVec3::new(1.0, 2.0, 0.0)).length() < 1e-12);
        assert!((hit.normal + DVec3::Y).length() < 1e-12);
        assert!(!hit.front_face);
    }

    #[test]
    fn test_sentinel_never_hits() {
        let sphere = unit_sphere();
        assert!(!sphere.intersects(&Ray::NONE));
        assert!(sphere.nearest_intersection(&Ray::NONE).is_none());
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        assert_eq!(
            Sphere::new(DVec3::ZERO, 0.0).unwrap_err(),
            GeometryError::NonPositiveRadius(0.0)
        );
        assert!(Sphere::new(DVec3::ZERO, -1.0).is_err());
        assert!(Sphere::new(DVec3::ZERO, f64::NAN).is_err());
    }

    #[test]
    fn test_random_points_lie_on_surface_and_leave_it() {
        let sphere = Sphere::new(DVec3::new(0.0, 1.0, 0.0), 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let (point, dir) = sphere.random_point_and_direction(&mut rng);
            assert!(((point - sphere.center()).length() - 0.5).abs() < 1e-9);
            assert!(dir.dot(point - sphere.center()) > 0.0);
        }
    }

    #[test]
    fn test_texture_coordinates_measure_arcs() {
        let sphere = Sphere::new(DVec3::ZERO, 2.0).unwrap();
        let frame = sphere.texture_frame(DVec3::X, DVec3::Z);

        let (x, y) = sphere.texture_coordinates(&frame, DVec3::new(2.0, 0.0, 0.0));
        assert!((x - std::f64::consts::FRAC_PI_2 * 2.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);

        let (_, y) = sphere.texture_coordinates(&frame, DVec3::new(0.0, 2.0, 0.0));
        assert!((y - std::f64::consts::FRAC_PI_2 * 2.0).abs() < 1e-9);

        assert_eq!(sphere.texture_coordinates(&frame, DVec3::new(0.0, 0.0, 2.0)), (0.0, 0.0));
    }
}
