//! Random line samplers.
//!
//! Lines are returned as raw `(point, direction)` data so that crates under
//! test can build their own line types from them.

use nalgebra::{Point3, Vector3};
use rand::Rng;

/// Two lines given by a point and a direction each.
#[derive(Debug, Clone, Copy)]
pub struct SampledPair {
    pub c1: Point3<f64>,
    pub e1: Vector3<f64>,
    pub c2: Point3<f64>,
    pub e2: Vector3<f64>,
}

/// Uniformly distributed unit vector.
pub fn sample_unit_vector(rng: &mut impl Rng) -> Vector3<f64> {
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let norm = v.norm();
        // reject outside the unit ball
        if norm > 1e-3 && norm <= 1.0 {
            return v / norm;
        }
    }
}

/// Point in the cube `[-1, 1]^3`.
pub fn sample_point(rng: &mut impl Rng) -> Point3<f64> {
    Point3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    )
}

/// A random axis: point in `[-1, 1]^3`, uniform unit direction.
pub fn sample_axis(rng: &mut impl Rng) -> (Point3<f64>, Vector3<f64>) {
    (sample_point(rng), sample_unit_vector(rng))
}

/// Two random (in general skew) lines. With `origin_on_first` the first line
/// passes through the world origin.
pub fn sample_skew_lines(rng: &mut impl Rng, origin_on_first: bool) -> SampledPair {
    let c1 = if origin_on_first {
        Point3::origin()
    } else {
        sample_point(rng)
    };
    SampledPair {
        c1,
        e1: sample_unit_vector(rng),
        c2: sample_point(rng),
        e2: sample_unit_vector(rng),
    }
}

/// Two random lines that meet at a point of the first one.
pub fn sample_intersecting_lines(rng: &mut impl Rng, origin_on_first: bool) -> SampledPair {
    let c1 = if origin_on_first {
        Point3::origin()
    } else {
        sample_point(rng)
    };
    let e1 = sample_unit_vector(rng);
    let e2 = sample_unit_vector(rng);
    let meet = c1 + e1 * rng.gen_range(-1.0..1.0);
    let c2 = meet + e2 * rng.gen_range(-1.0..1.0);
    SampledPair { c1, e1, c2, e2 }
}

/// Two parallel (possibly anti-parallel) lines. With `identical` the second
/// line is the first one, shifted along itself.
pub fn sample_parallel_lines(rng: &mut impl Rng, identical: bool) -> SampledPair {
    let c1 = sample_point(rng);
    let e1 = sample_unit_vector(rng);
    let e2 = if rng.gen_bool(0.5) { e1 } else { -e1 };
    let c2 = if identical {
        c1 + e1 * rng.gen_range(-1.0..1.0)
    } else {
        loop {
            let c2 = sample_point(rng);
            let offset = c2 - c1;
            if (offset - e1 * e1.dot(&offset)).norm() > 1e-2 {
                break c2;
            }
        }
    };
    SampledPair { c1, e1, c2, e2 }
}

/// A random serial chain of `dof` axes as `(point, direction, prismatic)`.
///
/// Consecutive axes are generically skew; about one joint in four is prismatic.
pub fn sample_chain(rng: &mut impl Rng, dof: usize) -> Vec<(Point3<f64>, Vector3<f64>, bool)> {
    (0..dof)
        .map(|_| {
            let (point, direction) = sample_axis(rng);
            (point, direction, rng.gen_bool(0.25))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    #[test]
    fn sample_chain_has_requested_length() {
        let mut rng = seeded_rng(6);
        let chain = sample_chain(&mut rng, 7);
        assert_eq!(chain.len(), 7);
        assert!(chain.iter().all(|(_, d, _)| (d.norm() - 1.0).abs() < 1e-12));
    }

    #[test]
    fn unit_vectors_are_unit() {
        let mut rng = seeded_rng(3);
        for _ in 0..100 {
            assert!((sample_unit_vector(&mut rng).norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn intersecting_lines_share_a_point() {
        let mut rng = seeded_rng(4);
        for _ in 0..20 {
            let pair = sample_intersecting_lines(&mut rng, false);
            // coplanar: (c2 - c1) . (e1 x e2) == 0
            let triple = (pair.c2 - pair.c1).dot(&pair.e1.cross(&pair.e2));
            assert!(triple.abs() < 1e-12);
        }
    }

    #[test]
    fn parallel_lines_are_parallel() {
        let mut rng = seeded_rng(5);
        for _ in 0..20 {
            let pair = sample_parallel_lines(&mut rng, false);
            assert!(pair.e1.cross(&pair.e2).norm() < 1e-15);
        }
    }
}
