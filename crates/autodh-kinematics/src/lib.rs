//! Automatic Denavit-Hartenberg parameter extraction for serial chains.
//!
//! Joint axes come in as world-frame lines; DH rows come out, each tagged with
//! the joint type and how unique its frame assignment is. A validator then
//! composes the rows back into axes and reports per-joint residuals.
//!
//! # Architecture
//!
//! ```text
//! KinematicChain ──► DhExtractor ──► DhTable ──► ChainValidator ──► ValidationReport
//!                       │
//!                       └─ CommonNormal per axis pair (optionally in parallel)
//! ```
//!
//! Geometric degeneracy (parallel, intersecting or coincident axes) is data,
//! not an error: it travels on [`DhParameters::degeneracy`] and is printed by
//! the [`DhTable`] `Display` impl. Tables are extracted in the standard
//! convention; [`DhTable::modified_rows`] and [`DhTable::forward_in`] read the
//! same table in the modified one. The library logs through `tracing` and never
//! installs a subscriber.

pub mod chain;
pub mod extractor;
pub mod params;
pub mod pipeline;
pub mod validator;

pub use chain::{ChainJoint, JointType, KinematicChain, LocalJoint};
pub use extractor::{DhExtractor, frame_from_axes};
pub use params::{
    ConventionDisplay, DhConvention, DhParameters, DhTable, dh_matrix, dh_matrix_modified,
    dh_transform, dh_transform_modified,
};
pub use pipeline::{Extraction, extract_and_validate};
pub use validator::{ChainValidator, JointResidual, ValidationReport};
