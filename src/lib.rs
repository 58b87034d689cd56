//! aa-pitfalls - A/A tests for assignment/analysis level mismatches
//!
//! Treatment is assigned per user with a salted stable hash. Outcomes are then
//! aggregated per row, per impression, or per user and compared with a
//! two-sample t-test. Repeating this over many salts shows how often a test
//! with no real effect comes out "significant": close to alpha when analysis
//! matches assignment, far above it when rows of the same user are treated as
//! independent.

pub mod cli;
pub mod dataset;
pub mod download;
pub mod experiment;
pub mod simulate;
pub mod tracing_setup;
