// autodh-core: errors and configuration shared by the autodh crates.

pub mod config;
pub mod error;

pub use config::{AutoDhConfig, ExtractionConfig, LineConfig, ValidationConfig};
pub use error::{AutoDhError, ChainError, ConfigError, LineError};
