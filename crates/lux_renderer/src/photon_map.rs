//! Photon map: a kd-tree over absorbed photons.
//!
//! Photons are reordered in place so that every leaf owns a contiguous
//! slice; branches split at the median along the longest axis of their
//! photons' bounds.

use std::collections::BinaryHeap;

use lux_math::{Aabb, DVec3, Photon};
use ordered_float::OrderedFloat;

/// Maximum photons per leaf before splitting.
const LEAF_MAX_SIZE: usize = 8;

/// kd-tree node. Leaves index into the map's photon storage.
#[derive(Debug)]
enum KdNode {
    Leaf {
        start: usize,
        end: usize,
    },
    /// Photons on the left have `coord(axis) <= split`, those on the right
    /// `coord(axis) >= split`.
    Branch {
        axis: usize,
        split: f64,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
}

/// Absorbed photons with a nearest-neighbor index.
#[derive(Debug)]
pub struct PhotonMap {
    photons: Vec<Photon>,
    root: KdNode,
}

impl PhotonMap {
    /// Build the index over a set of absorbed photons.
    pub fn new(mut photons: Vec<Photon>) -> Self {
        let n = photons.len();
        let root = build(&mut photons, 0);
        log::debug!("Photon map: kd-tree over {} photons", n);
        Self { photons, root }
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// All photons, in storage order.
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// The `k` photons closest to `point`, nearest first.
    ///
    /// `k == 0` returns every photon in storage order; `k >= len()` returns
    /// every photon sorted by distance.
    pub fn k_nearest(&self, point: DVec3, k: usize) -> Vec<&Photon> {
        if k == 0 {
            return self.photons.iter().collect();
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.search(&self.root, point, k, &mut heap);

        heap.into_sorted_vec()
            .into_iter()
            .map(|(_, index)| &self.photons[index])
            .collect()
    }

    fn search(
        &self,
        node: &KdNode,
        point: DVec3,
        k: usize,
        heap: &mut BinaryHeap<(OrderedFloat<f64>, usize)>,
    ) {
        match node {
            KdNode::Leaf { start, end } => {
                for index in *start..*end {
                    let d2 = (self.photons[index].origin() - point).length_squared();
                    if heap.len() < k {
                        heap.push((OrderedFloat(d2), index));
                    } else if heap.peek().is_some_and(|(worst, _)| d2 < worst.0) {
                        heap.pop();
                        heap.push((OrderedFloat(d2), index));
                    }
                }
            }
            KdNode::Branch {
                axis,
                split,
                left,
                right,
            } => {
                let diff = point[*axis] - split;
                let (near, far) = if diff < 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };

                self.search(near, point, k, heap);

                let worth_visiting = heap.len() < k
                    || heap
                        .peek()
                        .is_some_and(|(worst, _)| diff * diff < worst.0);
                if worth_visiting {
                    self.search(far, point, k, heap);
                }
            }
        }
    }
}

/// Recursive median split over `photons`, which start at `offset` in the
/// map's storage.
fn build(photons: &mut [Photon], offset: usize) -> KdNode {
    let n = photons.len();
    if n <= LEAF_MAX_SIZE {
        return KdNode::Leaf {
            start: offset,
            end: offset + n,
        };
    }

    let axis = Aabb::enclosing(photons.iter().map(Photon::origin)).longest_axis();
    let mid = n / 2;
    photons.select_nth_unstable_by(mid, |a, b| a.origin()[axis].total_cmp(&b.origin()[axis]));
    let split = photons[mid].origin()[axis];

    let (lower, upper) = photons.split_at_mut(mid);
    KdNode::Branch {
        axis,
        split,
        left: Box::new(build(lower, offset)),
        right: Box::new(build(upper, offset + mid)),
    }
}
