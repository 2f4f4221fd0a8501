//! Shared test fixtures and utilities for autodh crates.
//!
//! Provides deterministic RNG setup, random line-pair and chain samplers, and
//! a handful of canned robot arms described by parent-relative joint origins.

pub mod fixtures;
pub mod rng;
pub mod samplers;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{
    JointFixture, planar_two_link, scara, six_dof_arm, skewed_three_link, stacked_two_link,
};
pub use rng::{deterministic_joint_values, joint_values_within, seeded_rng};
pub use samplers::{
    SampledPair, sample_axis, sample_chain, sample_intersecting_lines, sample_parallel_lines,
    sample_point, sample_skew_lines, sample_unit_vector,
};
