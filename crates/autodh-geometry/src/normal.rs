//! Common perpendicular between two consecutive joint axes.
//!
//! Every pair of well-formed lines yields a [`CommonNormal`]. Parallel,
//! intersecting and coincident pairs are legitimate robot geometry, so they
//! are reported through [`Degeneracy`] rather than as errors.

use std::fmt;

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use autodh_core::ExtractionConfig;

use crate::canonical::canonical_sign;
use crate::line::AxisLine;

// ---------------------------------------------------------------------------
// Degeneracy
// ---------------------------------------------------------------------------

/// How two axes relate, and therefore how unique their common normal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    /// Skew lines: a unique common normal.
    #[default]
    None,
    /// Distinct parallel lines: infinitely many normals, all of the same length.
    Parallel,
    /// Non-parallel lines that meet: zero length, direction fixed only up to sign.
    Intersecting,
    /// The same line: zero length, direction free in the normal plane.
    Coincident,
}

impl Degeneracy {
    /// Whether the frame assignment for this pair involves an arbitrary choice.
    pub const fn is_degenerate(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Parallel => "parallel",
            Self::Intersecting => "intersecting",
            Self::Coincident => "coincident",
        }
    }
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CommonNormal
// ---------------------------------------------------------------------------

/// The common perpendicular of two lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonNormal {
    /// Foot of the normal on the first line.
    pub point_on_first: Point3<f64>,
    /// Foot of the normal on the second line.
    pub point_on_second: Point3<f64>,
    /// Unit direction from the first line toward the second.
    /// `None` only for [`Degeneracy::Coincident`].
    pub direction: Option<Unit<Vector3<f64>>>,
    /// Length of the normal; exactly 0 for intersecting and coincident pairs.
    pub distance: f64,
    pub degeneracy: Degeneracy,
}

impl CommonNormal {
    /// Classify `first` and `second` and compute their common normal.
    ///
    /// * `|d1 x d2| < angle_tolerance`: parallel. The normal is the part of
    ///   `r2 - r1` orthogonal to `d1` (`r1`, `r2` being each line's point nearest
    ///   the origin); if that is shorter than `distance_tolerance` the lines
    ///   coincide.
    /// * Otherwise the closest points are solved for. A gap below
    ///   `distance_tolerance` means the lines intersect; the direction is then
    ///   `d1 x d2` with [`canonical_sign`] applied.
    /// * Otherwise the lines are skew and the direction is `d1 x d2`, oriented
    ///   from the foot on `first` to the foot on `second`.
    pub fn between(first: &AxisLine, second: &AxisLine, config: &ExtractionConfig) -> Self {
        let d1 = first.direction().into_inner();
        let d2 = second.direction().into_inner();
        let n = d1.cross(&d2);
        let sin = n.norm();

        if sin < config.angle_tolerance {
            return Self::parallel(first, second, config.distance_tolerance);
        }

        let r1 = first.point();
        let r2 = second.point();
        let w = r1 - r2;
        let b = d1.dot(&d2);
        let p = d1.dot(&w);
        let q = d2.dot(&w);
        // 1 - b^2 == |d1 x d2|^2 for unit directions
        let denom = sin * sin;
        let s = (b * q - p) / denom;
        let t = (q - b * p) / denom;
        let point_on_first = r1 + d1 * s;
        let point_on_second = r2 + d2 * t;
        let gap = point_on_second - point_on_first;
        let distance = gap.norm();

        if distance < config.distance_tolerance {
            return Self {
                point_on_first,
                point_on_second,
                direction: Some(canonical_sign(Unit::new_unchecked(n / sin))),
                distance: 0.0,
                degeneracy: Degeneracy::Intersecting,
            };
        }

        let direction = if n.dot(&gap) >= 0.0 { n / sin } else { -n / sin };
        Self {
            point_on_first,
            point_on_second,
            direction: Some(Unit::new_unchecked(direction)),
            distance,
            degeneracy: Degeneracy::None,
        }
    }

    fn parallel(first: &AxisLine, second: &AxisLine, distance_tolerance: f64) -> Self {
        let d1 = first.direction().into_inner();
        let r1 = first.point();
        let r2 = second.point();
        let offset = r2 - r1;
        let perpendicular = offset - d1 * d1.dot(&offset);
        let distance = perpendicular.norm();

        if distance < distance_tolerance {
            return Self {
                point_on_first: r2,
                point_on_second: r2,
                direction: None,
                distance: 0.0,
                degeneracy: Degeneracy::Coincident,
            };
        }

        Self {
            point_on_first: r1,
            point_on_second: second.closest_point_on_line(&r1),
            direction: Some(Unit::new_unchecked(perpendicular / distance)),
            distance,
            degeneracy: Degeneracy::Parallel,
        }
    }

    /// The normal as a line through the foot on the first axis.
    pub fn as_line(&self) -> Option<AxisLine> {
        let direction = self.direction?;
        AxisLine::from_point_direction(self.point_on_first, direction.into_inner()).ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
