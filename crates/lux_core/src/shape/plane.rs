//! Infinite plane primitive.

use lux_math::{DVec3, Ray};

use super::{plane_crossing, Frame, GeometryError, Intersection, Primitive, DEGENERATE_EPSILON};

/// An infinite plane through `point` with unit normal `normal`.
///
/// Both sides behave the same: the reported normal always faces the side
/// the ray comes from.
#[derive(Debug, Clone)]
pub struct Plane {
    point: DVec3,
    normal: DVec3,
}

impl Plane {
    pub fn new(point: DVec3, normal: DVec3) -> Result<Self, GeometryError> {
        if normal.length() < DEGENERATE_EPSILON {
            return Err(GeometryError::ZeroNormal);
        }
        Ok(Self {
            point,
            normal: normal.normalize(),
        })
    }

    pub fn point(&self) -> DVec3 {
        self.point
    }

    pub fn normal(&self) -> DVec3 {
        self.normal
    }
}

impl Primitive for Plane {
    fn nearest_intersection(&self, ray: &Ray) -> Option<Intersection> {
        plane_crossing(ray, self.point, self.normal)
    }

    fn texture_frame(&self, hint_x: DVec3, hint_y: DVec3) -> Frame {
        Frame::tangent(self.normal, hint_x, hint_y)
    }

    fn texture_coordinates(&self, frame: &Frame, point: DVec3) -> (f64, f64) {
        let rel = point - self.point;
        (rel.dot(frame.x), rel.dot(frame.y))
    }
}
