//! Extraction followed by round-trip validation, driven by one [`AutoDhConfig`].

use serde::{Deserialize, Serialize};

use autodh_core::{AutoDhConfig, AutoDhError};

use crate::chain::KinematicChain;
use crate::extractor::DhExtractor;
use crate::params::DhTable;
use crate::validator::{ChainValidator, ValidationReport};

/// What a presentation layer needs: the table and the evidence for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub table: DhTable,
    pub report: ValidationReport,
}

/// Validate `config`, extract the DH table of `chain` and check it.
///
/// A failed round trip is not an error; inspect [`ValidationReport::passed`].
///
/// # Errors
///
/// [`AutoDhError::Config`] for an invalid configuration,
/// [`AutoDhError::Chain`] for a chain with fewer than two joints.
pub fn extract_and_validate(
    chain: &KinematicChain,
    config: &AutoDhConfig,
) -> Result<Extraction, AutoDhError> {
    config.validate()?;
    let table = DhExtractor::new(config.extraction).extract(chain)?;
    let report = ChainValidator::new(config.validation).validate_table(chain, &table);
    Ok(Extraction { table, report })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::JointType;
    use autodh_core::{ConfigError, LineConfig};
    use nalgebra::{Point3, Vector3};

    fn two_link() -> KinematicChain {
        KinematicChain::from_axes(
            "base",
            "tool",
            [
                ("shoulder", JointType::Revolute, Point3::origin(), Vector3::z()),
                ("elbow", JointType::Revolute, Point3::new(0.0, 0.0, 0.3), Vector3::y()),
            ],
            &LineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn default_config_extracts_and_validates() {
        let out = extract_and_validate(&two_link(), &AutoDhConfig::default()).unwrap();
        assert_eq!(out.table.rows().len(), 1);
        assert!(out.report.passed());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AutoDhConfig::default();
        config.extraction.angle_tolerance = -1.0;
        let err = extract_and_validate(&two_link(), &config).unwrap_err();
        assert!(matches!(err, AutoDhError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn stored_extraction_with_missing_frames_is_rejected() {
        let out = extract_and_validate(&two_link(), &AutoDhConfig::default()).unwrap();
        let mut value = serde_json::to_value(&out).unwrap();
        value["table"]["frames"] = serde_json::json!([]);
        let err = serde_json::from_value::<Extraction>(value).unwrap_err();
        assert!(err.to_string().contains("1 rows but 0 link frames"), "{err}");
    }
}
