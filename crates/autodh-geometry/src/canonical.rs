//! Deterministic tie-breaks for directions the geometry leaves open.
//!
//! Whenever a connecting direction is only defined up to sign, or up to a
//! rotation in a plane, the pipeline resolves it through these functions so
//! that repeated runs on the same input assign the same frames.

use std::f64::consts::PI;

use nalgebra::{Unit, Vector3};

/// Components at or below this magnitude do not decide a sign.
pub const SIGN_EPSILON: f64 = 1e-12;

/// Flip `v` so that its first significant component (x, then y, then z) is positive.
pub fn canonical_sign(v: Unit<Vector3<f64>>) -> Unit<Vector3<f64>> {
    for i in 0..3 {
        if v[i].abs() > SIGN_EPSILON {
            return if v[i] > 0.0 { v } else { -v };
        }
    }
    v
}

/// A unit vector orthogonal to `direction`, chosen from the world axes.
///
/// Takes the world axis least aligned with `direction` (ties resolved x before
/// y before z) and removes its component along `direction`. The least aligned
/// axis has an absolute component of at most `1/sqrt(3)`, so the projection
/// never collapses.
pub fn canonical_perpendicular(direction: &Unit<Vector3<f64>>) -> Unit<Vector3<f64>> {
    let d = direction.into_inner();
    let mut axis = 0;
    for i in 1..3 {
        if d[i].abs() < d[axis].abs() {
            axis = i;
        }
    }
    let reference = Vector3::ith(axis, 1.0);
    Unit::new_normalize(reference - d * d.dot(&reference))
}

/// Component of `hint` orthogonal to `direction`, normalised.
///
/// Returns `None` when `hint` is (nearly) parallel to `direction`, i.e. the
/// orthogonal part is shorter than `epsilon`.
pub fn perpendicular_toward(
    direction: &Unit<Vector3<f64>>,
    hint: &Vector3<f64>,
    epsilon: f64,
) -> Option<Unit<Vector3<f64>>> {
    let projected = hint - direction.into_inner() * direction.dot(hint);
    Unit::try_new(projected, epsilon)
}

/// Wrap an angle into `(-pi, pi]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped <= -PI { PI } else { wrapped }
}

/// Signed angle from `from` to `to` about `axis`, in `(-pi, pi]`.
///
/// Both vectors are expected to be orthogonal to `axis`; any component along it
/// is ignored by construction of the `atan2` arguments.
pub fn signed_angle(from: &Vector3<f64>, to: &Vector3<f64>, axis: &Vector3<f64>) -> f64 {
    wrap_angle(from.cross(to).dot(axis).atan2(from.dot(to)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn canonical_sign_keeps_positive_leading_component() {
        let v = Unit::new_normalize(Vector3::new(0.0, 1.0, -1.0));
        assert_eq!(canonical_sign(v), v);
    }

    #[test]
    fn canonical_sign_flips_negative_leading_component() {
        let v = Unit::new_normalize(Vector3::new(-1.0, 2.0, 3.0));
        let c = canonical_sign(v);
        assert!(c.x > 0.0);
        assert_relative_eq!(c.into_inner(), -v.into_inner());
    }

    #[test]
    fn canonical_sign_skips_tiny_components() {
        let v = Unit::new_normalize(Vector3::new(1e-14, 0.0, -1.0));
        let c = canonical_sign(v);
        assert!(c.z > 0.0);
    }

    #[test]
    fn canonical_perpendicular_of_z_is_x() {
        let z = Vector3::z_axis();
        assert_relative_eq!(canonical_perpendicular(&z).into_inner(), Vector3::x());
    }

    #[test]
    fn canonical_perpendicular_of_x_is_y() {
        let x = Vector3::x_axis();
        assert_relative_eq!(canonical_perpendicular(&x).into_inner(), Vector3::y());
    }

    #[test]
    fn canonical_perpendicular_is_orthogonal() {
        for raw in [
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-0.3, 0.9, 0.1),
            Vector3::new(0.0, -1.0, 1e-7),
        ] {
            let d = Unit::new_normalize(raw);
            let p = canonical_perpendicular(&d);
            assert_relative_eq!(p.dot(&d), 0.0, epsilon = 1e-12);
            assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn perpendicular_toward_projects_hint() {
        let z = Vector3::z_axis();
        let p = perpendicular_toward(&z, &Vector3::new(2.0, 0.0, 5.0), 1e-9).unwrap();
        assert_relative_eq!(p.into_inner(), Vector3::x());
    }

    #[test]
    fn perpendicular_toward_rejects_parallel_hint() {
        let z = Vector3::z_axis();
        assert!(perpendicular_toward(&z, &Vector3::new(0.0, 0.0, -3.0), 1e-9).is_none());
    }

    #[test]
    fn wrap_angle_range() {
        assert_relative_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(wrap_angle(PI), PI);
        assert_relative_eq!(wrap_angle(3.0 * FRAC_PI_2), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(0.25), 0.25, epsilon = 1e-15);
    }

    #[test]
    fn signed_angle_right_hand_rule() {
        let x = Vector3::x();
        let y = Vector3::y();
        let z = Vector3::z();
        assert_relative_eq!(signed_angle(&x, &y, &z), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(signed_angle(&y, &x, &z), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(signed_angle(&x, &(-x), &z), PI, epsilon = 1e-12);
    }
}
