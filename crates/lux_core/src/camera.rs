//! Cameras map normalized image coordinates to primary rays and back.
//!
//! `(u, v)` are in `[0, 1]`: `u` grows to the right of the image, `v` grows
//! towards its top. The viewing direction is `vector_x × vector_y`.

use lux_math::{DVec3, Ray};

use crate::shape::{GeometryError, DEGENERATE_EPSILON};

/// Camera contract used by both renderers.
pub trait Camera: Send + Sync {
    /// Primary ray through normalized image coordinates.
    fn get_ray(&self, u: f64, v: f64) -> Ray;

    /// Normalized image coordinates at which `point` is seen, if in frame.
    fn can_see(&self, point: DVec3) -> Option<(f64, f64)>;
}

/// Orthonormal camera basis shared by both projections.
#[derive(Debug, Clone, Copy)]
struct Basis {
    x: DVec3,
    y: DVec3,
    forward: DVec3,
}

impl Basis {
    fn new(vector_x: DVec3, vector_y: DVec3) -> Result<Self, GeometryError> {
        let x = vector_x.normalize_or_zero();
        let y = (vector_y - x * x.dot(vector_y)).normalize_or_zero();
        let forward = x.cross(y);
        if forward.length() < DEGENERATE_EPSILON {
            return Err(GeometryError::DegenerateCameraBasis);
        }
        Ok(Self { x, y, forward })
    }
}

fn check_extent(size_x: f64, size_y: f64, max: f64) -> Result<(), GeometryError> {
    let valid = |s: f64| s > 0.0 && s < max;
    if valid(size_x) && valid(size_y) {
        Ok(())
    } else {
        Err(GeometryError::InvalidCameraExtent(size_x, size_y))
    }
}

fn in_frame(u: f64, v: f64) -> Option<(f64, f64)> {
    let unit = 0.0..=1.0;
    (unit.contains(&u) && unit.contains(&v)).then_some((u, v))
}

/// Orthographic camera: parallel rays leaving a `size_x` by `size_y` window.
#[derive(Debug, Clone)]
pub struct PlanarCamera {
    origin: DVec3,
    basis: Basis,
    size_x: f64,
    size_y: f64,
}

impl PlanarCamera {
    pub fn new(
        origin: DVec3,
        vector_x: DVec3,
        vector_y: DVec3,
        size_x: f64,
        size_y: f64,
    ) -> Result<Self, GeometryError> {
        check_extent(size_x, size_y, f64::INFINITY)?;
        Ok(Self {
            origin,
            basis: Basis::new(vector_x, vector_y)?,
            size_x,
            size_y,
        })
    }
}

impl Camera for PlanarCamera {
    fn get_ray(&self, u: f64, v: f64) -> Ray {
        let start = self.origin - self.basis.x * (self.size_x * (u - 0.5))
            + self.basis.y * (self.size_y * (v - 0.5));
        Ray::new(start, self.basis.forward)
    }

    fn can_see(&self, point: DVec3) -> Option<(f64, f64)> {
        let rel = point - self.origin;
        if rel.dot(self.basis.forward) <= 0.0 {
            return None;
        }
        let u = -rel.dot(self.basis.x) / self.size_x + 0.5;
        let v = rel.dot(self.basis.y) / self.size_y + 0.5;
        in_frame(u, v)
    }
}

/// Pinhole camera with horizontal and vertical opening angles in radians.
#[derive(Debug, Clone)]
pub struct ConicCamera {
    origin: DVec3,
    basis: Basis,
    angle_x: f64,
    angle_y: f64,
}

impl ConicCamera {
    pub fn new(
        origin: DVec3,
        vector_x: DVec3,
        vector_y: DVec3,
        angle_x: f64,
        angle_y: f64,
    ) -> Result<Self, GeometryError> {
        check_extent(angle_x, angle_y, std::f64::consts::PI)?;
        Ok(Self {
            origin,
            basis: Basis::new(vector_x, vector_y)?,
            angle_x,
            angle_y,
        })
    }
}

impl Camera for ConicCamera {
    fn get_ray(&self, u: f64, v: f64) -> Ray {
        let tan_x = (self.angle_x * (u - 0.5)).tan();
        let tan_y = (self.angle_y * (v - 0.5)).tan();
        let direction = self.basis.forward - self.basis.x * tan_x + self.basis.y * tan_y;
        Ray::new(self.origin, direction)
    }

    fn can_see(&self, point: DVec3) -> Option<(f64, f64)> {
        let rel = point - self.origin;
        let depth = rel.dot(self.basis.forward);
        if depth <= 0.0 {
            return None;
        }
        let u = (-rel.dot(self.basis.x)).atan2(depth) / self.angle_x + 0.5;
        let v = rel.dot(self.basis.y).atan2(depth) / self.angle_y + 0.5;
        in_frame(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar() -> PlanarCamera {
        // Looking down -Z: X × Y = Z, so flip X
        PlanarCamera::new(DVec3::new(0.0, 0.0, 5.0), -DVec3::X, DVec3::Y, 4.0, 2.0).unwrap()
    }

    #[test]
    fn test_planar_rays_are_parallel() {
        let cam = planar();
        let center = cam.get_ray(0.5, 0.5);
        let corner = cam.get_ray(0.0, 1.0);

        assert_eq!(center.origin(), DVec3::new(0.0, 0.0, 5.0));
        assert_eq!(center.direction(), -DVec3::Z);
        assert_eq!(corner.direction(), center.direction());
        assert!((corner.origin() - DVec3::new(-2.0, 1.0, 5.0)).length() < 1e-12);
    }

    #[test]
    fn test_planar_can_see_inverts_get_ray() {
        let cam = planar();
        for &(u, v) in &[(0.5, 0.5), (0.1, 0.9), (0.75, 0.2), (0.05, 0.95)] {
            let ray = cam.get_ray(u, v);
            let (su, sv) = cam.can_see(ray.at(3.0)).unwrap();
            assert!((su - u).abs() < 1e-9);
            assert!((sv - v).abs() < 1e-9);
        }
    }

    #[test]
    fn test_planar_rejects_out_of_frame_and_behind() {
        let cam = planar();
        assert!(cam.can_see(DVec3::new(0.0, 0.0, 6.0)).is_none());
        assert!(cam.can_see(DVec3::new(3.0, 0.0, 0.0)).is_none());
        assert!(cam.can_see(DVec3::new(0.0, 0.0, 0.0)).is_some());
    }

    #[test]
    fn test_conic_can_see_inverts_get_ray() {
        let cam = ConicCamera::new(DVec3::ZERO, DVec3::X, DVec3::Y, 1.2, 0.9).unwrap();
        let center = cam.get_ray(0.5, 0.5);
        assert_eq!(center.direction(), DVec3::Z);

        for &(u, v) in &[(0.5, 0.5), (0.02, 0.03), (0.3, 0.8), (0.95, 0.6)] {
            let ray = cam.get_ray(u, v);
            let (su, sv) = cam.can_see(ray.at(7.0)).unwrap();
            assert!((su - u).abs() < 1e-9);
            assert!((sv - v).abs() < 1e-9);
        }
        assert!(cam.can_see(DVec3::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn test_degenerate_cameras_rejected() {
        assert!(matches!(
            PlanarCamera::new(DVec3::ZERO, DVec3::X, DVec3::X * 2.0, 1.0, 1.0),
            Err(GeometryError::DegenerateCameraBasis)
        ));
        assert!(matches!(
            PlanarCamera::new(DVec3::ZERO, DVec3::X, DVec3::Y, 0.0, 1.0),
            Err(GeometryError::InvalidCameraExtent(..))
        ));
        assert!(matches!(
            ConicCamera::new(DVec3::ZERO, DVec3::X, DVec3::Y, 4.0, 1.0),
            Err(GeometryError::InvalidCameraExtent(..))
        ));
    }
}
