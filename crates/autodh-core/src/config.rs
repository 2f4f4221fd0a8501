use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_direction_epsilon() -> f64 {
    1e-9
}
const fn default_angle_tolerance() -> f64 {
    1e-6
}
const fn default_distance_tolerance() -> f64 {
    1e-6
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.into(),
            message: format!("must be finite and > 0, got {value}"),
        })
    }
}

// ---------------------------------------------------------------------------
// LineConfig
// ---------------------------------------------------------------------------

/// Construction settings for axis lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Directions shorter than this are rejected as degenerate (default: 1e-9).
    #[serde(default = "default_direction_epsilon")]
    pub direction_epsilon: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            direction_epsilon: default_direction_epsilon(),
        }
    }
}

impl LineConfig {
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] unless `direction_epsilon` is finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("line.direction_epsilon", self.direction_epsilon)
    }
}

// ---------------------------------------------------------------------------
// ExtractionConfig
// ---------------------------------------------------------------------------

/// Tolerances used to classify consecutive joint axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Two axes are parallel when `|d1 x d2|` is below this (default: 1e-6).
    #[serde(default = "default_angle_tolerance")]
    pub angle_tolerance: f64,

    /// Two non-parallel axes intersect when their common normal is shorter
    /// than this; parallel axes coincide likewise (default: 1e-6).
    #[serde(default = "default_distance_tolerance")]
    pub distance_tolerance: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            angle_tolerance: default_angle_tolerance(),
            distance_tolerance: default_distance_tolerance(),
        }
    }
}

impl ExtractionConfig {
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first tolerance that is not
    /// finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("extraction.angle_tolerance", self.angle_tolerance)?;
        check_positive("extraction.distance_tolerance", self.distance_tolerance)
    }
}

// ---------------------------------------------------------------------------
// ValidationConfig
// ---------------------------------------------------------------------------

/// Residual limits applied when a reconstructed axis is compared to its input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum angle between reconstructed and input direction, radians (default: 1e-6).
    #[serde(default = "default_angle_tolerance")]
    pub angle_tolerance: f64,

    /// Maximum distance from a reconstructed frame origin to its input axis (default: 1e-6).
    #[serde(default = "default_distance_tolerance")]
    pub distance_tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            angle_tolerance: default_angle_tolerance(),
            distance_tolerance: default_distance_tolerance(),
        }
    }
}

impl ValidationConfig {
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first tolerance that is not
    /// finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("validation.angle_tolerance", self.angle_tolerance)?;
        check_positive("validation.distance_tolerance", self.distance_tolerance)
    }
}

// ---------------------------------------------------------------------------
// AutoDhConfig
// ---------------------------------------------------------------------------

/// Full configuration surface of the pipeline.
///
/// Nothing in the pipeline reads a process-wide default: every entry point
/// receives the piece of this struct it needs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoDhConfig {
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl AutoDhConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError::InvalidValue`] found, in section order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.line.validate()?;
        self.extraction.validate()?;
        self.validation.validate()
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Toml`] for malformed input, otherwise as [`AutoDhConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`AutoDhConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- defaults ----

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AutoDhConfig::default();
        assert!((cfg.line.direction_epsilon - 1e-9).abs() < f64::EPSILON);
        assert!((cfg.extraction.angle_tolerance - 1e-6).abs() < f64::EPSILON);
        assert!((cfg.extraction.distance_tolerance - 1e-6).abs() < f64::EPSILON);
        assert!((cfg.validation.angle_tolerance - 1e-6).abs() < f64::EPSILON);
        assert!((cfg.validation.distance_tolerance - 1e-6).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    // ---- validate ----

    #[test]
    fn validate_rejects_zero_tolerance() {
        let cfg = AutoDhConfig {
            extraction: ExtractionConfig {
                angle_tolerance: 0.0,
                ..ExtractionConfig::default()
            },
            ..AutoDhConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("extraction.angle_tolerance"));
    }

    #[test]
    fn validate_rejects_nan() {
        let cfg = ValidationConfig {
            distance_tolerance: f64::NAN,
            ..ValidationConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "validation.distance_tolerance"
        ));
    }

    #[test]
    fn validate_rejects_negative_epsilon() {
        let cfg = LineConfig {
            direction_epsilon: -1.0,
        };
        assert!(cfg.validate().is_err());
    }

    // ---- TOML ----

    #[test]
    fn toml_partial_document_keeps_defaults() {
        let cfg = AutoDhConfig::from_toml_str(
            r"
            [extraction]
            angle_tolerance = 1e-4
        ",
        )
        .unwrap();
        assert!((cfg.extraction.angle_tolerance - 1e-4).abs() < f64::EPSILON);
        assert!((cfg.extraction.distance_tolerance - 1e-6).abs() < f64::EPSILON);
        assert_eq!(cfg.validation, ValidationConfig::default());
        assert_eq!(cfg.line, LineConfig::default());
    }

    #[test]
    fn toml_empty_document_is_default() {
        let cfg = AutoDhConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AutoDhConfig::default());
    }

    #[test]
    fn toml_invalid_value_rejected() {
        let result = AutoDhConfig::from_toml_str(
            r"
            [validation]
            distance_tolerance = -0.5
        ",
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn toml_syntax_error_reported() {
        let result = AutoDhConfig::from_toml_str("[extraction\nangle_tolerance = 1");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn from_file() {
        let dir = std::env::temp_dir().join("autodh_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("autodh.toml");
        std::fs::write(
            &path,
            r"
            [line]
            direction_epsilon = 1e-12

            [validation]
            angle_tolerance = 1e-8
            distance_tolerance = 1e-8
        ",
        )
        .unwrap();

        let cfg = AutoDhConfig::from_file(&path).unwrap();
        assert!((cfg.line.direction_epsilon - 1e-12).abs() < f64::EPSILON);
        assert!((cfg.validation.angle_tolerance - 1e-8).abs() < f64::EPSILON);
        assert_eq!(cfg.extraction, ExtractionConfig::default());

        // Cleanup
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn from_file_not_found() {
        let result = AutoDhConfig::from_file("/nonexistent/path/autodh.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn json_roundtrip() {
        let cfg = AutoDhConfig {
            extraction: ExtractionConfig {
                angle_tolerance: 1e-5,
                distance_tolerance: 2e-5,
            },
            ..AutoDhConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: AutoDhConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
