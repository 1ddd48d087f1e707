use crate::{DVec3, Interval};

/// Axis-aligned bounding box, used to pick split axes in the photon kd-tree.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// An empty AABB (contains nothing); grows with [`Aabb::include`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create an AABB from two corner points.
    pub fn from_points(a: DVec3, b: DVec3) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        }
    }

    /// Bounds of a set of points; `EMPTY` when there are none.
    pub fn enclosing<I>(points: I) -> Self
    where
        I: IntoIterator<Item = DVec3>,
    {
        points.into_iter().fold(Self::EMPTY, |aabb, p| aabb.include(p))
    }

    /// Grow the box so that it contains `p`.
    pub fn include(&self, p: DVec3) -> Self {
        Self {
            x: self.x.include(p.x),
            y: self.y.include(p.y),
            z: self.z.include(p.z),
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: DVec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Get the longest axis (0=X, 1=Y, 2=Z).
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }
}
