// A/A test simulation with hash-based user assignment
//
// Treatment is assigned per user via a salted stable hash, then outcomes are
// aggregated at row, impression, or user granularity and compared with a
// two-sample t-test. Repeating over many salts gives the empirical false
// positive rate for each analysis level. Under a correct design (analysis
// level == assignment level) that rate should sit near alpha; analysing
// finer units than were randomized treats correlated rows as independent
// and inflates it.
//
// Implementation:
// - Uses fnv (crates.io) plus a SplitMix64 finalizer for salted assignment
// - Uses aprender (crates.io) for the two-sample t-test
// - Uses trueno (crates.io) for SIMD-optimized mean and variance

mod aggregate;
mod assignment;
mod config;
mod runner;
mod statistics;
mod summary;

pub use aggregate::{aggregate, AnalysisLevel, ArmTotals, LevelAggregate, UnitKey};
pub use assignment::{assign_user, salt_for_trial, Arm, TrialAssignment};
pub use config::{AaTestConfig, ConfigError};
pub use runner::{run_aa_test, run_trial};
pub use statistics::{compare_arms, ArmComparison, Degenerate};
pub use summary::{AaReport, ArmSnapshot, LevelSummary, TrialResult};
