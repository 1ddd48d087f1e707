//! Reflection and refraction of unit directions.
//!
//! Normals passed here face the incoming direction (`d · n <= 0`), which is
//! the convention every shape follows when it reports an intersection.

use crate::DVec3;

/// Tolerance used to detect a direction arriving along the normal.
pub const NORMAL_INCIDENCE_EPSILON: f64 = 1e-9;

/// Mirror `d` about the unit normal `n`: `r = d - 2(d·n)n`.
#[inline]
pub fn reflect(d: DVec3, n: DVec3) -> DVec3 {
    d - 2.0 * d.dot(n) * n
}

/// Bend `d` through an interface with index ratio `ratio` (left / entered).
///
/// - ratio of exactly 1, or normal incidence: the direction is unchanged.
/// - `sin θr > 1`: total internal reflection, the reflected direction is
///   returned.
/// - otherwise the outgoing direction is built from the tangent
///   `normalize(d + n)`.
pub fn refract(d: DVec3, n: DVec3, ratio: f64) -> DVec3 {
    if ratio == 1.0 {
        return d;
    }
    if n.dot(d) + 1.0 < NORMAL_INCIDENCE_EPSILON {
        return d;
    }

    let sin_i = n.cross(d).length();
    let sin_r = ratio * sin_i;

    if sin_r > 1.0 {
        return reflect(d, n);
    }

    let tangent = (d + n).normalize_or_zero();
    let cos_r = (1.0 - sin_r * sin_r).sqrt();

    (-n * cos_r + tangent * sin_r).normalize_or_zero()
}
