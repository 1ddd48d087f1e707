//! Random direction sampling used by emitters.

use lux_math::DVec3;
use rand::{Rng, RngCore};

/// Uniform random direction on the unit sphere (rejection sampled).
pub fn random_unit_vector(rng: &mut dyn RngCore) -> DVec3 {
    loop {
        let p = DVec3::new(
            rng.gen::<f64>() * 2.0 - 1.0,
            rng.gen::<f64>() * 2.0 - 1.0,
            rng.gen::<f64>() * 2.0 - 1.0,
        );
        let len_sq = p.length_squared();
        if len_sq > 1e-12 && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Uniform random direction in the open hemisphere around `axis`.
pub fn random_in_hemisphere(axis: DVec3, rng: &mut dyn RngCore) -> DVec3 {
    loop {
        let v = random_unit_vector(rng);
        if v.dot(axis) > 0.0 {
            return v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unit_vectors_are_unit() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unit_vectors_cover_the_sphere() {
        let mut rng = StdRng::seed_from_u64(11);
        let mean = (0..20_000)
            .map(|_| random_unit_vector(&mut rng))
            .fold(DVec3::ZERO, |acc, v| acc + v)
            / 20_000.0;
        assert!(mean.length() < 0.05);
    }

    #[test]
    fn test_hemisphere_stays_on_its_side() {
        let mut rng = StdRng::seed_from_u64(3);
        let axis = DVec3::new(1.0, -1.0, 0.5).normalize();
        for _ in 0..1000 {
            assert!(random_in_hemisphere(axis, &mut rng).dot(axis) > 0.0);
        }
    }
}
