//! Round-trip check of DH rows against the axes they were extracted from.
//!
//! Starting from link frame 0 on the first axis, the DH transforms are
//! composed one row at a time. After `i` rows the predicted frame's z-axis and
//! origin must reproduce joint `i`'s input axis. The composition is sequential
//! by nature: frame `i + 1` depends on frame `i`.

use std::fmt;

use nalgebra::{Isometry3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use autodh_core::ValidationConfig;
use autodh_geometry::AxisLine;

use crate::chain::KinematicChain;
use crate::extractor::base_frame;
use crate::params::{DhParameters, DhTable};

/// Residuals of one joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointResidual {
    pub index: usize,
    pub name: String,
    /// Angle between the predicted z-axis and the input axis direction (radians).
    pub angular_error: f64,
    /// Distance from the predicted frame origin to the input axis line.
    pub distance_error: f64,
    pub passed: bool,
}

/// Per-joint outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub joints: Vec<JointResidual>,
    /// Joints that no row reaches (fewer than `n - 1` rows were supplied).
    pub missing: Vec<usize>,
    pub angle_tolerance: f64,
    pub distance_tolerance: f64,
}

impl ValidationReport {
    /// Every joint was reconstructed within tolerance.
    pub fn passed(&self) -> bool {
        self.missing.is_empty() && self.joints.iter().all(|j| j.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &JointResidual> {
        self.joints.iter().filter(|j| !j.passed)
    }

    pub fn max_angular_error(&self) -> f64 {
        self.joints.iter().map(|j| j.angular_error).fold(0.0, f64::max)
    }

    pub fn max_distance_error(&self) -> f64 {
        self.joints.iter().map(|j| j.distance_error).fold(0.0, f64::max)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>3}  {:<20} {:>14} {:>14}  {}",
            "#", "joint", "angle err", "dist err", "status"
        )?;
        for j in &self.joints {
            writeln!(
                f,
                "{:>3}  {:<20} {:>14.3e} {:>14.3e}  {}",
                j.index,
                j.name,
                j.angular_error,
                j.distance_error,
                if j.passed { "ok" } else { "FAIL" }
            )?;
        }
        for index in &self.missing {
            writeln!(f, "{index:>3}  (no DH row reaches this joint)")?;
        }
        Ok(())
    }
}

/// Reconstructs a chain from DH rows and measures how far off it lands.
#[derive(Debug, Clone, Default)]
pub struct ChainValidator {
    config: ValidationConfig,
}

impl ChainValidator {
    pub const fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Validate `rows` against `chain`, starting from the chain's canonical
    /// frame 0 (or its base hint).
    ///
    /// Never fails: residuals above tolerance are reported, not raised.
    pub fn validate(&self, chain: &KinematicChain, rows: &[DhParameters]) -> ValidationReport {
        if chain.is_empty() {
            return self.report(Vec::new(), Vec::new());
        }
        self.validate_from(chain, base_frame(chain), rows)
    }

    /// Validate an extracted table, starting from the table's own frame 0.
    pub fn validate_table(&self, chain: &KinematicChain, table: &DhTable) -> ValidationReport {
        self.validate_from(chain, *table.base_frame(), table.rows())
    }

    fn validate_from(
        &self,
        chain: &KinematicChain,
        base: Isometry3<f64>,
        rows: &[DhParameters],
    ) -> ValidationReport {
        let mut frame = base;
        let mut residuals = Vec::with_capacity(chain.len());
        let mut missing = Vec::new();

        for (index, joint) in chain.joints().iter().enumerate() {
            if index > rows.len() {
                missing.push(index);
                continue;
            }
            if index > 0 {
                frame *= rows[index - 1].transform();
            }

            let (angular_error, distance_error) = residual(&frame, &joint.axis);
            let passed = angular_error < self.config.angle_tolerance
                && distance_error < self.config.distance_tolerance;
            if !passed {
                warn!(
                    index,
                    joint = %joint.name,
                    angular_error,
                    distance_error,
                    "reconstructed axis out of tolerance"
                );
            }
            residuals.push(JointResidual {
                index,
                name: joint.name.clone(),
                angular_error,
                distance_error,
                passed,
            });
        }

        let report = self.report(residuals, missing);
        info!(
            joints = chain.len(),
            passed = report.passed(),
            max_angular_error = report.max_angular_error(),
            max_distance_error = report.max_distance_error(),
            "chain validation finished"
        );
        report
    }

    fn report(&self, joints: Vec<JointResidual>, missing: Vec<usize>) -> ValidationReport {
        ValidationReport {
            joints,
            missing,
            angle_tolerance: self.config.angle_tolerance,
            distance_tolerance: self.config.distance_tolerance,
        }
    }
}

/// Angular and positional error of `frame`'s z-axis against `axis`.
fn residual(frame: &Isometry3<f64>, axis: &AxisLine) -> (f64, f64) {
    let z = frame.rotation * Vector3::z();
    let direction = axis.direction().into_inner();
    let angle = z.cross(&direction).norm().atan2(z.dot(&direction));
    let origin = Point3::from(frame.translation.vector);
    (angle, axis.distance_to_point(&origin))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
