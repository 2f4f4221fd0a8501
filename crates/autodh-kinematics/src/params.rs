//! Denavit-Hartenberg rows and tables.
//!
//! Tables are extracted in the standard (distal) convention: row `i` maps
//! link frame `i` (on joint axis `i`) to link frame `i + 1` by
//!
//! ```text
//! T_i = RotZ(theta) * TransZ(d) * TransX(a) * RotX(alpha)
//! ```
//!
//! so joint `i`'s variable adds to `theta` (revolute) or `d` (prismatic).
//!
//! [`DhTable::modified_rows`] regroups the same table into the modified
//! (proximal, Craig) convention, one row per joint:
//!
//! ```text
//! T_i = RotX(alpha_{i-1}) * TransX(a_{i-1}) * RotZ(theta_i) * TransZ(d_i)
//! ```
//!
//! `TransX` and `RotX` commute, so both tables give the same end pose.

use std::f64::consts::PI;
use std::fmt;

use nalgebra::{Isometry3, Matrix4, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use autodh_core::ChainError;
use autodh_geometry::Degeneracy;

use crate::chain::{JointType, joint_motion};

// ---------------------------------------------------------------------------
// DhConvention
// ---------------------------------------------------------------------------

/// Order in which a DH row's four elementary motions are composed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DhConvention {
    /// `RotZ(theta) * TransZ(d) * TransX(a) * RotX(alpha)`.
    #[default]
    Standard,
    /// `RotX(alpha) * TransX(a) * RotZ(theta) * TransZ(d)`.
    Modified,
}

impl DhConvention {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Modified => "modified",
        }
    }

    /// Transform of one row in this convention.
    pub fn transform(self, a: f64, alpha: f64, d: f64, theta: f64) -> Isometry3<f64> {
        match self {
            Self::Standard => dh_transform(a, alpha, d, theta),
            Self::Modified => dh_transform_modified(a, alpha, d, theta),
        }
    }
}

impl fmt::Display for DhConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DhParameters
// ---------------------------------------------------------------------------

/// One DH row: the transition from joint `i`'s frame to joint `i + 1`'s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhParameters {
    /// Name of joint `i`, whose variable this row carries.
    pub joint: String,
    pub joint_type: JointType,
    /// Link length, `>= 0`.
    pub a: f64,
    /// Link twist, in `(-pi, pi]`.
    pub alpha: f64,
    /// Link offset.
    pub d: f64,
    /// Joint angle at the reference configuration, in `(-pi, pi]`.
    pub theta: f64,
    /// Relation of axes `i` and `i + 1`. Anything but `None` means the frame
    /// assignment behind this row was one choice among many.
    pub degeneracy: Degeneracy,
}

impl DhParameters {
    /// Whether the row is the only DH parameterisation of this joint pair.
    pub const fn is_unique(&self) -> bool {
        !self.degeneracy.is_degenerate()
    }

    /// Homogeneous transform at the reference configuration.
    pub fn transform(&self) -> Isometry3<f64> {
        dh_transform(self.a, self.alpha, self.d, self.theta)
    }

    /// Transform with the joint variable `q` applied.
    pub fn transform_at(&self, q: f64) -> Isometry3<f64> {
        self.transform_in(DhConvention::Standard, q)
    }

    /// Transform with the joint variable `q` applied, read in `convention`.
    pub fn transform_in(&self, convention: DhConvention, q: f64) -> Isometry3<f64> {
        let (d, theta) = match self.joint_type {
            JointType::Revolute => (self.d, self.theta + q),
            JointType::Prismatic => (self.d + q, self.theta),
        };
        convention.transform(self.a, self.alpha, d, theta)
    }
}

/// `RotZ(theta) * TransZ(d) * TransX(a) * RotX(alpha)`.
pub fn dh_transform(a: f64, alpha: f64, d: f64, theta: f64) -> Isometry3<f64> {
    let (st, ct) = theta.sin_cos();
    Isometry3::from_parts(
        Translation3::new(a * ct, a * st, d),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), theta)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), alpha),
    )
}

/// The same transform as a 4x4 homogeneous matrix, written out explicitly.
#[rustfmt::skip]
pub fn dh_matrix(a: f64, alpha: f64, d: f64, theta: f64) -> Matrix4<f64> {
    let (st, ct) = theta.sin_cos();
    let (sa, ca) = alpha.sin_cos();
    Matrix4::new(
        ct, -st * ca, st * sa, a * ct,
        st, ct * ca, -ct * sa, a * st,
        0.0, sa, ca, d,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// `RotX(alpha) * TransX(a) * RotZ(theta) * TransZ(d)`.
pub fn dh_transform_modified(a: f64, alpha: f64, d: f64, theta: f64) -> Isometry3<f64> {
    let (sa, ca) = alpha.sin_cos();
    Isometry3::from_parts(
        Translation3::new(a, -sa * d, ca * d),
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), alpha)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), theta),
    )
}

/// [`dh_transform_modified`] as a 4x4 homogeneous matrix.
#[rustfmt::skip]
pub fn dh_matrix_modified(a: f64, alpha: f64, d: f64, theta: f64) -> Matrix4<f64> {
    let (st, ct) = theta.sin_cos();
    let (sa, ca) = alpha.sin_cos();
    Matrix4::new(
        ct, -st, 0.0, a,
        st * ca, ct * ca, -sa, -sa * d,
        st * sa, ct * sa, ca, ca * d,
        0.0, 0.0, 0.0, 1.0,
    )
}

// ---------------------------------------------------------------------------
// DhTable
// ---------------------------------------------------------------------------

/// Result of a DH extraction: `n - 1` rows for an `n`-joint chain, plus the
/// `n` link frames they were read from.
///
/// Deserialization checks the row and frame counts, so every table has a
/// base frame and at least one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDhTable")]
pub struct DhTable {
    rows: Vec<DhParameters>,
    /// World placement of each link frame at the reference configuration.
    frames: Vec<Isometry3<f64>>,
    last_joint: String,
    last_joint_type: JointType,
}

/// Unchecked serialized form of [`DhTable`].
#[derive(Deserialize)]
struct RawDhTable {
    rows: Vec<DhParameters>,
    frames: Vec<Isometry3<f64>>,
    last_joint: String,
    last_joint_type: JointType,
}

impl TryFrom<RawDhTable> for DhTable {
    type Error = ChainError;

    fn try_from(raw: RawDhTable) -> Result<Self, Self::Error> {
        if raw.frames.len() != raw.rows.len() + 1 {
            return Err(ChainError::FrameCountMismatch {
                rows: raw.rows.len(),
                frames: raw.frames.len(),
            });
        }
        if raw.rows.is_empty() {
            return Err(ChainError::InsufficientChain { joints: 1 });
        }
        Ok(Self::new(raw.rows, raw.frames, raw.last_joint, raw.last_joint_type))
    }
}

impl DhTable {
    pub(crate) fn new(
        rows: Vec<DhParameters>,
        frames: Vec<Isometry3<f64>>,
        last_joint: String,
        last_joint_type: JointType,
    ) -> Self {
        debug_assert_eq!(rows.len() + 1, frames.len());
        Self {
            rows,
            frames,
            last_joint,
            last_joint_type,
        }
    }

    /// DH rows in chain order.
    pub fn rows(&self) -> &[DhParameters] {
        &self.rows
    }

    /// Link frames in the world, one per joint.
    pub fn frames(&self) -> &[Isometry3<f64>] {
        &self.frames
    }

    /// World placement of frame 0; all DH transforms are relative to it.
    pub fn base_frame(&self) -> &Isometry3<f64> {
        &self.frames[0]
    }

    /// Number of joints (one more than the number of rows).
    pub fn dof(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn last_joint(&self) -> (&str, JointType) {
        (&self.last_joint, self.last_joint_type)
    }

    /// Rows whose frame assignment is not unique.
    pub fn degenerate_rows(&self) -> impl Iterator<Item = (usize, &DhParameters)> {
        self.rows.iter().enumerate().filter(|(_, row)| !row.is_unique())
    }

    /// Pose of every link frame relative to frame 0 at joint values `q`.
    ///
    /// Frame `i` is placed before joint `i` moves; the first entry is the identity.
    ///
    /// # Errors
    ///
    /// [`ChainError::JointCountMismatch`] if `q.len() != self.dof()`.
    pub fn forward_frames(&self, q: &[f64]) -> Result<Vec<Isometry3<f64>>, ChainError> {
        self.check_dof(q)?;
        let mut transform = Isometry3::identity();
        let mut frames = Vec::with_capacity(self.dof());
        frames.push(transform);
        for (row, &value) in self.rows.iter().zip(q) {
            transform *= row.transform_at(value);
            frames.push(transform);
        }
        Ok(frames)
    }

    /// The table regrouped into the modified convention: one row per joint.
    ///
    /// Row `i` takes `a` and `alpha` from standard row `i - 1` (zero for the
    /// first joint) and `d` and `theta` from standard row `i` (zero for the
    /// last joint). Its degeneracy describes axes `i - 1` and `i`.
    pub fn modified_rows(&self) -> Vec<DhParameters> {
        let previous = std::iter::once(None).chain(self.rows.iter().map(Some));
        let current = self
            .rows
            .iter()
            .map(|row| (row.joint.clone(), row.joint_type, row.d, row.theta))
            .chain(std::iter::once((
                self.last_joint.clone(),
                self.last_joint_type,
                0.0,
                0.0,
            )));
        previous
            .zip(current)
            .map(|(prev, (joint, joint_type, d, theta))| DhParameters {
                joint,
                joint_type,
                a: prev.map_or(0.0, |p| p.a),
                alpha: prev.map_or(0.0, |p| p.alpha),
                d,
                theta,
                degeneracy: prev.map_or(Degeneracy::None, |p| p.degeneracy),
            })
            .collect()
    }

    /// End pose relative to frame 0: the last link frame after the last joint moves.
    ///
    /// # Errors
    ///
    /// [`ChainError::JointCountMismatch`] if `q.len() != self.dof()`.
    pub fn forward(&self, q: &[f64]) -> Result<Isometry3<f64>, ChainError> {
        self.check_dof(q)?;
        let mut transform = Isometry3::identity();
        for (row, &value) in self.rows.iter().zip(q) {
            transform *= row.transform_at(value);
        }
        let last = q[self.rows.len()];
        Ok(transform * joint_motion(&Vector3::z_axis(), self.last_joint_type, last))
    }

    /// End pose relative to frame 0, composed from the rows of `convention`.
    ///
    /// # Errors
    ///
    /// [`ChainError::JointCountMismatch`] if `q.len() != self.dof()`.
    pub fn forward_in(
        &self,
        convention: DhConvention,
        q: &[f64],
    ) -> Result<Isometry3<f64>, ChainError> {
        match convention {
            DhConvention::Standard => self.forward(q),
            DhConvention::Modified => {
                self.check_dof(q)?;
                Ok(self
                    .modified_rows()
                    .iter()
                    .zip(q)
                    .fold(Isometry3::identity(), |transform, (row, &value)| {
                        transform * row.transform_in(DhConvention::Modified, value)
                    }))
            }
        }
    }

    /// [`DhTable::forward`] expressed in the world frame.
    ///
    /// # Errors
    ///
    /// [`ChainError::JointCountMismatch`] if `q.len() != self.dof()`.
    pub fn world_transform(&self, q: &[f64]) -> Result<Isometry3<f64>, ChainError> {
        Ok(self.base_frame() * self.forward(q)?)
    }

    /// Printable view of the table in `convention`.
    pub const fn display_in(&self, convention: DhConvention) -> ConventionDisplay<'_> {
        ConventionDisplay {
            table: self,
            convention,
        }
    }

    fn check_dof(&self, q: &[f64]) -> Result<(), ChainError> {
        if q.len() == self.dof() {
            Ok(())
        } else {
            Err(ChainError::JointCountMismatch {
                expected: self.dof(),
                got: q.len(),
            })
        }
    }
}

impl fmt::Display for DhTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rows(f, &self.rows)
    }
}

/// A [`DhTable`] printed in a chosen convention, with a heading naming it.
#[derive(Debug, Clone, Copy)]
pub struct ConventionDisplay<'a> {
    table: &'a DhTable,
    convention: DhConvention,
}

impl fmt::Display for ConventionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "convention: {}", self.convention)?;
        match self.convention {
            DhConvention::Standard => write_rows(f, &self.table.rows),
            DhConvention::Modified => write_rows(f, &self.table.modified_rows()),
        }
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[DhParameters]) -> fmt::Result {
    writeln!(
        f,
        "{:>3}  {:<20} {:>12} {:>10} {:>12} {:>10}  {:<9}  {}",
        "#", "joint", "a", "alpha[deg]", "d", "theta[deg]", "type", "degeneracy"
    )?;
    for (i, row) in rows.iter().enumerate() {
        writeln!(
            f,
            "{:>3}  {:<20} {:>12.6} {:>10.3} {:>12.6} {:>10.3}  {:<9}  {}",
            i,
            row.joint,
            row.a,
            row.alpha * 180.0 / PI,
            row.d,
            row.theta * 180.0 / PI,
            row.joint_type.as_str(),
            row.degeneracy,
        )?;
    }
    let degenerate = rows.iter().filter(|row| !row.is_unique()).count();
    if degenerate > 0 {
        writeln!(
            f,
            "note: {degenerate} row(s) come from parallel or intersecting axes; \
             their frame assignment is not unique"
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
