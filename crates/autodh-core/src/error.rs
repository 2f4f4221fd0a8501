//! Error types for the autodh pipeline.
//!
//! Only malformed input is an error. Parallel, intersecting and coincident
//! joint axes are ordinary robot geometry and travel through the pipeline as
//! data (see `autodh_geometry::Degeneracy`), never through these enums.

use thiserror::Error;

/// Top-level error type for autodh.
#[derive(Debug, Error)]
pub enum AutoDhError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Line error: {0}")]
    Line(#[from] LineError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised while constructing a line.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LineError {
    /// The supplied direction is (numerically) the zero vector.
    #[error("degenerate line: direction magnitude {magnitude:e} is below {epsilon:e}")]
    Degenerate { magnitude: f64, epsilon: f64 },

    /// A coordinate was NaN or infinite.
    #[error("line coordinates must be finite")]
    NonFinite,
}

/// Errors raised while assembling or consuming a kinematic chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    /// A joint axis could not be turned into a line.
    #[error("joint {index} ({name}): {source}")]
    DegenerateAxis {
        index: usize,
        name: String,
        source: LineError,
    },

    /// Fewer than two joints: no DH row is defined.
    #[error("kinematic chain needs at least 2 joints, got {joints}")]
    InsufficientChain { joints: usize },

    /// Joint value vector does not match the number of DH rows.
    #[error("joint count mismatch: expected {expected}, got {got}")]
    JointCountMismatch { expected: usize, got: usize },

    /// A DH table needs exactly one link frame more than it has rows.
    #[error("DH table has {rows} rows but {frames} link frames")]
    FrameCountMismatch { rows: usize, frames: usize },
}

impl ChainError {
    /// Index of the offending joint, when the error is tied to one.
    pub const fn joint_index(&self) -> Option<usize> {
        match self {
            Self::DegenerateAxis { index, .. } => Some(*index),
            Self::InsufficientChain { .. }
            | Self::JointCountMismatch { .. }
            | Self::FrameCountMismatch { .. } => None,
        }
    }
}
