//! Parallelepiped primitive: six parallelogram faces spanned by three edges.

use lux_math::{DVec3, Ray};
use rand::{Rng, RngCore};

use super::{
    inside_edge, plane_crossing, Frame, GeometryError, Intersection, Primitive, Solid,
    DEGENERATE_EPSILON,
};
use crate::sampling::random_in_hemisphere;

/// Four corners of a face, in order around its boundary.
type Face = [DVec3; 4];

#[derive(Debug, Clone)]
pub struct Parallelepiped {
    corner: DVec3,
    x: DVec3,
    y: DVec3,
    z: DVec3,
}

impl Parallelepiped {
    /// `corner` plus the three edge vectors leaving it.
    pub fn new(corner: DVec3, x: DVec3, y: DVec3, z: DVec3) -> Result<Self, GeometryError> {
        for (name, edge) in [('x', x), ('y', y), ('z', z)] {
            if edge.length() < DEGENERATE_EPSILON {
                return Err(GeometryError::ZeroEdge(name));
            }
        }
        let volume = x.cross(y).dot(z).abs();
        if volume < DEGENERATE_EPSILON * x.length() * y.length() * z.length() {
            return Err(GeometryError::FlatParallelepiped);
        }
        Ok(Self { corner, x, y, z })
    }

    pub fn center(&self) -> DVec3 {
        self.corner + (self.x + self.y + self.z) * 0.5
    }

    fn faces(&self) -> [Face; 6] {
        let a = self.corner;
        let b = a + self.z;
        let c = a + self.z + self.y;
        let d = a + self.y;
        let e = a + self.x;
        let f = e + self.z;
        let g = e + self.y + self.z;
        let h = e + self.y;

        [
            [a, b, c, d],
            [e, f, g, h],
            [b, f, g, c],
            [c, g, h, d],
            [d, h, e, a],
            [a, b, f, e],
        ]
    }

    fn face_intersection(&self, ray: &Ray, [a, b, c, d]: Face) -> Option<Intersection> {
        let normal = (b - a).cross(d - a).normalize_or_zero();
        let hit = plane_crossing(ray, a, normal)?;
        let x = hit.point;

        let inside = inside_edge(x, a, b, d)
            && inside_edge(x, a, d, b)
            && inside_edge(x, c, b, d)
            && inside_edge(x, c, d, b);
        if !inside {
            return None;
        }

        // Convex: the facing normal points away from the center iff the ray
        // comes from outside.
        let front_face = (x - self.center()).dot(hit.normal) > 0.0;
        Some(Intersection { front_face, ..hit })
    }

    /// Face normal oriented away from the center.
    fn outward_normal(&self, [a, b, _, d]: Face) -> DVec3 {
        let normal = (b - a).cross(d - a).normalize_or_zero();
        if (a - self.center()).dot(normal) < 0.0 {
            -normal
        } else {
            normal
        }
    }
}

impl Primitive for Parallelepiped {
    fn nearest_intersection(&self, ray: &Ray) -> Option<Intersection> {
        let start = ray.origin();
        self.faces()
            .into_iter()
            .filter_map(|face| self.face_intersection(ray, face))
            .min_by(|p, q| {
                let dp = (p.point - start).length_squared();
                let dq = (q.point - start).length_squared();
                dp.total_cmp(&dq)
            })
    }

    fn texture_frame(&self, hint_x: DVec3, hint_y: DVec3) -> Frame {
        Frame::from_hints(hint_x, hint_y)
    }

    fn texture_coordinates(&self, frame: &Frame, point: DVec3) -> (f64, f64) {
        let rel = point - self.corner;
        (rel.dot(frame.x), rel.dot(frame.y))
    }
}

impl Solid for Parallelepiped {
    fn random_point_and_direction(&self, rng: &mut dyn RngCore) -> (DVec3, DVec3) {
        let face = self.faces()[rng.gen_range(0..6)];
        let [a, b, _, d] = face;
        let s: f64 = rng.gen();
        let t: f64 = rng.gen();
        let point = a + (b - a) * s + (d - a) * t;

        (point, random_in_hemisphere(self.outward_normal(face), rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_math::Aabb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_cube() -> Parallelepiped {
        Parallelepiped::new(DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z).unwrap()
    }

    #[test]
    fn test_hit_nearest_face_from_outside() {
        let cube = unit_cube();
        let ray = Ray::new(DVec3::new(0.5, 0.5, 5.0), -DVec3::Z);

        let hit = cube.nearest_intersection(&ray).unwrap();
        assert!((hit.point - DVec3::new(0.5, 0.5, 1.0)).length() < 1e-12);
        assert_eq!(hit.normal, DVec3::Z);
        assert!(hit.front_face);
    }

    #[test]
    fn test_hit_from_inside_is_back_face() {
        let cube = unit_cube();
        let ray = Ray::new(DVec3::splat(0.5), DVec3::X);

        let hit = cube.nearest_intersection(&ray).unwrap();
        assert!((hit.point - DVec3::new(1.0, 0.5, 0.5)).length() < 1e-12);
        assert_eq!(hit.normal, -DVec3::X);
        assert!(!hit.front_face);
    }

    #[test]
    fn test_miss_beside_the_box() {
        let cube = unit_cube();
        assert!(!cube.intersects(&Ray::new(DVec3::new(2.0, 0.5, 5.0), -DVec3::Z)));
        assert!(!cube.intersects(&Ray::new(DVec3::new(0.5, 0.5, 5.0), DVec3::Z)));
    }

    #[test]
    fn test_sheared_box() {
        let sheared = Parallelepiped::new(
            DVec3::ZERO,
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::Z,
        )
        .unwrap();
        // Above the slanted part of the footprint
        assert!(sheared.intersects(&Ray::new(DVec3::new(2.2, 0.5, 4.0), -DVec3::Z)));
        // Outside the footprint, although inside its bounding box
        assert!(!sheared.intersects(&Ray::new(DVec3::new(0.2, 0.9, 4.0), -DVec3::Z)));
    }

    #[test]
    fn test_degenerate_boxes_rejected() {
        assert_eq!(
            Parallelepiped::new(DVec3::ZERO, DVec3::ZERO, DVec3::Y, DVec3::Z).unwrap_err(),
            GeometryError::ZeroEdge('x')
        );
        assert_eq!(
            Parallelepiped::new(DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0))
                .unwrap_err(),
            GeometryError::FlatParallelepiped
        );
    }

    #[test]
    fn test_random_points_on_boundary_leave_outward() {
        let cube = unit_cube();
        let bounds = Aabb::from_points(DVec3::ZERO, DVec3::ONE);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..500 {
            let (point, dir) = cube.random_point_and_direction(&mut rng);
            assert!(bounds.contains(point));
            // A point nudged along the direction is outside the box
            let nudged = point + dir * 1e-3;
            let outside = nudged.min_element() < 0.0 || nudged.max_element() > 1.0;
            assert!(outside);
        }
    }
}
