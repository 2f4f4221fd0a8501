//! Line geometry for automatic Denavit-Hartenberg extraction.
//!
//! Joint axes are represented as oriented lines in Plücker coordinates
//! ([`AxisLine`]). For each pair of consecutive axes the common perpendicular
//! ([`CommonNormal`]) fixes the link length, the link twist and the x-axis of
//! the next link frame.
//!
//! # Architecture
//!
//! ```text
//! AxisLine ──► CommonNormal::between ──► (feet, direction, distance, Degeneracy)
//! ```
//!
//! Degenerate configurations are tagged, not rejected; the tie-breaks applied
//! to them live in [`canonical`].

pub mod canonical;
pub mod line;
pub mod normal;

pub use line::{AxisLine, DEFAULT_DIRECTION_EPSILON};
pub use normal::{CommonNormal, Degeneracy};
