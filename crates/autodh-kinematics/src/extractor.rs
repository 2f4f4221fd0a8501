//! DH parameter extraction from world-frame joint axes.
//!
//! For every consecutive pair of axes the common normal is computed first
//! (pairs are independent of each other), then the link frames are laid down
//! base to end and each row is read off two neighbouring frames:
//!
//! * frame `i`: z along axis `i`, origin on axis `i`, x along the normal
//!   arriving from axis `i - 1` (frame 0: base hint or canonical perpendicular)
//! * `a`: length of the normal between axes `i` and `i + 1`
//! * `alpha`: rotation from `z_i` to `z_{i+1}` about `x_{i+1}`
//! * `d`, `theta`: translation / rotation along and about `z_i` taking
//!   `x_i` onto `x_{i+1}`

use std::f64::consts::PI;

use nalgebra::{Isometry3, Matrix3, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use autodh_core::{ChainError, ExtractionConfig};
use autodh_geometry::canonical::{canonical_perpendicular, perpendicular_toward, signed_angle};
use autodh_geometry::{CommonNormal, DEFAULT_DIRECTION_EPSILON, Degeneracy};

use crate::chain::{ChainJoint, KinematicChain};
use crate::params::{DhParameters, DhTable};

/// Extracts a standard DH table from a [`KinematicChain`].
#[derive(Debug, Clone, Default)]
pub struct DhExtractor {
    config: ExtractionConfig,
}

impl DhExtractor {
    pub const fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Create an extractor with default tolerances.
    pub fn with_defaults() -> Self {
        Self::new(ExtractionConfig::default())
    }

    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract `n - 1` DH rows, and the `n` link frames they describe.
    ///
    /// Geometric degeneracy never fails the extraction; it is carried on each
    /// row as [`DhParameters::degeneracy`].
    ///
    /// # Errors
    ///
    /// [`ChainError::InsufficientChain`] if the chain has fewer than two joints.
    pub fn extract(&self, chain: &KinematicChain) -> Result<DhTable, ChainError> {
        let joints = chain.joints();
        if joints.len() < 2 {
            return Err(ChainError::InsufficientChain {
                joints: joints.len(),
            });
        }
        let last = &joints[joints.len() - 1];

        let normals = self.common_normals(joints);

        let mut frames = Vec::with_capacity(joints.len());
        let mut rows = Vec::with_capacity(normals.len());
        let mut frame = base_frame(chain);
        frames.push(frame);

        for (i, (pair, normal)) in joints.windows(2).zip(&normals).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            let next_frame = next_link_frame(next, normal);
            let row = dh_row(current, &frame, &next_frame, normal);

            if row.degeneracy.is_degenerate() {
                warn!(
                    index = i,
                    joint = %current.name,
                    next = %next.name,
                    degeneracy = %row.degeneracy,
                    "frame assignment is not unique for this joint pair"
                );
            }
            debug!(
                index = i,
                joint = %row.joint,
                a = row.a,
                alpha = row.alpha,
                d = row.d,
                theta = row.theta,
                "extracted DH row"
            );

            rows.push(row);
            frames.push(next_frame);
            frame = next_frame;
        }

        info!(
            base = chain.base_link(),
            end = chain.end_link(),
            rows = rows.len(),
            degenerate = rows.iter().filter(|r| !r.is_unique()).count(),
            "DH extraction finished"
        );

        Ok(DhTable::new(rows, frames, last.name.clone(), last.joint_type))
    }

    /// Common normal of every consecutive axis pair, in chain order.
    #[cfg(feature = "parallel")]
    pub fn common_normals(&self, joints: &[ChainJoint]) -> Vec<CommonNormal> {
        joints
            .par_windows(2)
            .map(|pair| self.classify(&pair[0], &pair[1]))
            .collect()
    }

    /// Common normal of every consecutive axis pair, in chain order.
    #[cfg(not(feature = "parallel"))]
    pub fn common_normals(&self, joints: &[ChainJoint]) -> Vec<CommonNormal> {
        joints
            .windows(2)
            .map(|pair| self.classify(&pair[0], &pair[1]))
            .collect()
    }

    fn classify(&self, current: &ChainJoint, next: &ChainJoint) -> CommonNormal {
        let normal = CommonNormal::between(&current.axis, &next.axis, &self.config);
        debug!(
            joint = %current.name,
            next = %next.name,
            degeneracy = %normal.degeneracy,
            distance = normal.distance,
            "classified axis pair"
        );
        normal
    }
}

/// World placement of link frame 0. The chain must not be empty.
///
/// z along the first axis, origin at the first axis' point nearest the world
/// origin, x from the chain's base hint when it has one usable component
/// normal to the axis, the canonical perpendicular otherwise.
pub(crate) fn base_frame(chain: &KinematicChain) -> Isometry3<f64> {
    let axis = &chain.joints()[0].axis;
    let z = axis.direction();
    let x = chain
        .base_x_hint()
        .and_then(|hint| perpendicular_toward(z, hint, DEFAULT_DIRECTION_EPSILON))
        .unwrap_or_else(|| canonical_perpendicular(z));
    frame_from_axes(&axis.point(), z, &x)
}

/// Right-handed frame with the given origin, z-axis and (approximate) x-axis.
///
/// `x` is re-orthogonalised against `z`; `y = z x x`.
pub fn frame_from_axes(
    origin: &Point3<f64>,
    z: &Unit<Vector3<f64>>,
    x: &Unit<Vector3<f64>>,
) -> Isometry3<f64> {
    let x = perpendicular_toward(z, &x.into_inner(), DEFAULT_DIRECTION_EPSILON)
        .unwrap_or_else(|| canonical_perpendicular(z))
        .into_inner();
    let z = z.into_inner();
    let y = z.cross(&x);
    let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]));
    Isometry3::from_parts(
        Translation3::from(origin.coords),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

fn next_link_frame(next: &ChainJoint, normal: &CommonNormal) -> Isometry3<f64> {
    let z = next.axis.direction();
    let x = normal.direction.unwrap_or_else(|| canonical_perpendicular(z));
    frame_from_axes(&normal.point_on_second, z, &x)
}

fn dh_row(
    joint: &ChainJoint,
    frame: &Isometry3<f64>,
    next_frame: &Isometry3<f64>,
    normal: &CommonNormal,
) -> DhParameters {
    let x = frame.rotation * Vector3::x();
    let z = frame.rotation * Vector3::z();
    let x_next = next_frame.rotation * Vector3::x();
    let z_next = next_frame.rotation * Vector3::z();

    let alpha = match normal.degeneracy {
        Degeneracy::Parallel | Degeneracy::Coincident => {
            if z.dot(&z_next) >= 0.0 { 0.0 } else { PI }
        }
        Degeneracy::None | Degeneracy::Intersecting => signed_angle(&z, &z_next, &x_next),
    };

    DhParameters {
        joint: joint.name.clone(),
        joint_type: joint.joint_type,
        a: normal.distance,
        alpha,
        d: (normal.point_on_first.coords - frame.translation.vector).dot(&z),
        theta: signed_angle(&x, &x_next, &z),
        degeneracy: normal.degeneracy,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::JointType;
    use approx::assert_relative_eq;
    use autodh_core::LineConfig;
    use autodh_test_utils::{sample_chain, seeded_rng};
    use std::f64::consts::FRAC_PI_2;

    fn chain(axes: &[([f64; 3], [f64; 3])]) -> KinematicChain {
        KinematicChain::from_axes(
            "base",
            "tool",
            axes.iter().enumerate().map(|(i, (p, d))| {
                (
                    format!("j{i}"),
                    JointType::Revolute,
                    Point3::from(*p),
                    Vector3::from(*d),
                )
            }),
            &LineConfig::default(),
        )
        .unwrap()
    }

    fn random_chain(seed: u64, dof: usize) -> KinematicChain {
        let mut rng = seeded_rng(seed);
        KinematicChain::from_axes(
            "base",
            "tool",
            sample_chain(&mut rng, dof)
                .into_iter()
                .enumerate()
                .map(|(i, (p, d, prismatic))| {
                    let joint_type = if prismatic {
                        JointType::Prismatic
                    } else {
                        JointType::Revolute
                    };
                    (format!("j{i}"), joint_type, p, d)
                }),
            &LineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn perpendicular_intersecting_axes() {
        let table = DhExtractor::with_defaults()
            .extract(&chain(&[([0.0; 3], [0.0, 0.0, 1.0]), ([0.0; 3], [1.0, 0.0, 0.0])]))
            .unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.degeneracy, Degeneracy::Intersecting);
        assert_relative_eq!(row.a, 0.0);
        assert_relative_eq!(row.alpha, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(row.d, 0.0, epsilon = 1e-12);
        assert_relative_eq!(row.theta, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn parallel_offset_axes() {
        let table = DhExtractor::with_defaults()
            .extract(&chain(&[([0.0; 3], [0.0, 0.0, 1.0]), ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0])]))
            .unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.degeneracy, Degeneracy::Parallel);
        assert_relative_eq!(row.a, 1.0, epsilon = 1e-12);
        assert_eq!(row.alpha, 0.0);
        assert_relative_eq!(row.theta, 0.0, epsilon = 1e-12);
        assert_relative_eq!(row.d, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn antiparallel_axes_twist_by_pi() {
        let table = DhExtractor::with_defaults()
            .extract(&chain(&[([0.0; 3], [0.0, 0.0, 1.0]), ([0.0, 2.0, 0.0], [0.0, 0.0, -1.0])]))
            .unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.alpha, PI);
        assert_relative_eq!(row.a, 2.0, epsilon = 1e-12);
        // normal points along +y, frame 0's x is +x
        assert_relative_eq!(row.theta, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn coincident_axes_use_offset_along_axis() {
        let table = DhExtractor::with_defaults()
            .extract(&chain(&[
                ([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
                ([0.0, 0.0, 0.7], [0.0, 0.0, 1.0]),
            ]))
            .unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.degeneracy, Degeneracy::Coincident);
        assert_eq!(row.a, 0.0);
        assert_eq!(row.alpha, 0.0);
        // both origins sit at the axis point nearest the world origin
        assert_relative_eq!(row.d, 0.0, epsilon = 1e-12);
        assert_relative_eq!(row.theta, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn skew_axes_textbook_values() {
        // z through origin, then x-direction line at height 0.5 offset 0.3 along y
        let table = DhExtractor::with_defaults()
            .extract(&chain(&[([0.0; 3], [0.0, 0.0, 1.0]), ([0.0, 0.3, 0.5], [1.0, 0.0, 0.0])]))
            .unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.degeneracy, Degeneracy::None);
        assert_relative_eq!(row.a, 0.3, epsilon = 1e-12);
        assert_relative_eq!(row.d, 0.5, epsilon = 1e-12);
        assert_relative_eq!(row.theta, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(row.alpha, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn base_hint_sets_first_x_axis() {
        let c = chain(&[([0.0; 3], [0.0, 0.0, 1.0]), ([0.0, 0.3, 0.5], [1.0, 0.0, 0.0])])
            .with_base_x_hint(Vector3::new(0.0, 2.0, 5.0));
        let table = DhExtractor::with_defaults().extract(&c).unwrap();
        let x0 = table.base_frame().rotation * Vector3::x();
        assert_relative_eq!(x0, Vector3::y(), epsilon = 1e-12);
        // x_0 now coincides with the normal, so theta vanishes
        assert_relative_eq!(table.rows()[0].theta, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn hint_along_axis_falls_back_to_canonical() {
        let c = chain(&[([0.0; 3], [0.0, 0.0, 1.0]), ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0])])
            .with_base_x_hint(Vector3::new(0.0, 0.0, 3.0));
        let frame = base_frame(&c);
        assert_relative_eq!(frame.rotation * Vector3::x(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn frames_follow_axes() {
        let c = random_chain(11, 6);
        let table = DhExtractor::with_defaults().extract(&c).unwrap();
        assert_eq!(table.frames().len(), c.len());
        for (frame, joint) in table.frames().iter().zip(c.joints()) {
            let z = frame.rotation * Vector3::z();
            assert_relative_eq!(z, joint.axis.direction().into_inner(), epsilon = 1e-9);
            let origin = Point3::from(frame.translation.vector);
            assert!(joint.axis.contains_point(&origin, 1e-9));
        }
    }

    #[test]
    fn rows_reproduce_frames() {
        let c = random_chain(12, 5);
        let table = DhExtractor::with_defaults().extract(&c).unwrap();
        for (i, row) in table.rows().iter().enumerate() {
            let predicted = table.frames()[i] * row.transform();
            let actual = table.frames()[i + 1];
            assert_relative_eq!(
                predicted.to_homogeneous(),
                actual.to_homogeneous(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn frame_from_axes_is_orthonormal() {
        let z = Unit::new_normalize(Vector3::new(1.0, 2.0, 3.0));
        // deliberately not orthogonal to z
        let x = Unit::new_normalize(Vector3::new(1.0, 0.0, 0.0));
        let frame = frame_from_axes(&Point3::new(1.0, 1.0, 1.0), &z, &x);
        let m = frame.rotation.to_rotation_matrix();
        assert_relative_eq!(m.matrix().column(2).into_owned(), z.into_inner(), epsilon = 1e-12);
        assert_relative_eq!(m.matrix().determinant(), 1.0, epsilon = 1e-12);
        assert_relative_eq!((frame.rotation * Vector3::x()).dot(&z), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn extraction_is_deterministic() {
        let c = random_chain(13, 7);
        let extractor = DhExtractor::with_defaults();
        let first = extractor.extract(&c).unwrap();
        let second = extractor.extract(&c).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn common_normals_keep_chain_order() {
        let c = chain(&[
            ([0.0; 3], [0.0, 0.0, 1.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ]);
        let normals = DhExtractor::with_defaults().common_normals(c.joints());
        assert_eq!(normals.len(), 2);
        assert_eq!(normals[0].degeneracy, Degeneracy::Parallel);
        assert_eq!(normals[1].degeneracy, Degeneracy::Intersecting);
    }
}
