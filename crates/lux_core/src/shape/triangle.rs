//! Triangle primitive.

use lux_math::{DVec3, Ray};

use super::{
    inside_edge, plane_crossing, Frame, GeometryError, Intersection, Primitive,
    DEGENERATE_EPSILON,
};

/// A one-sided-agnostic triangle: plane crossing plus three half-plane tests.
#[derive(Debug, Clone)]
pub struct Triangle {
    a: DVec3,
    b: DVec3,
    c: DVec3,
    normal: DVec3,
}

impl Triangle {
    pub fn new(a: DVec3, b: DVec3, c: DVec3) -> Result<Self, GeometryError> {
        let cross = (b - a).cross(c - a);
        if cross.length() < DEGENERATE_EPSILON {
            return Err(GeometryError::CollinearTriangle);
        }
        Ok(Self {
            a,
            b,
            c,
            normal: cross.normalize(),
        })
    }

    pub fn vertices(&self) -> [DVec3; 3] {
        [self.a, self.b, self.c]
    }

    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    fn contains(&self, x: DVec3) -> bool {
        inside_edge(x, self.a, self.c, self.b)
            && inside_edge(x, self.a, self.b, self.c)
            && inside_edge(x, self.b, self.c, self.a)
    }
}

impl Primitive for Triangle {
    fn nearest_intersection(&self, ray: &Ray) -> Option<Intersection> {
        plane_crossing(ray, self.a, self.normal).filter(|hit| self.contains(hit.point))
    }

    fn texture_frame(&self, hint_x: DVec3, hint_y: DVec3) -> Frame {
        Frame::tangent(self.normal, hint_x, hint_y)
    }

    fn texture_coordinates(&self, frame: &Frame, point: DVec3) -> (f64, f64) {
        let rel = point - self.a;
        (rel.dot(frame.x), rel.dot(frame.y))
    }
}
