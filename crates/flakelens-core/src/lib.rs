//! Heuristic diagnosis of flaky tests from retried runs.
//!
//! [`extract`] derives timing, error, console and attachment features from a
//! record's attempts; [`rules`] turns those features into reason tags;
//! [`engine::Analyzer`] composes both per record and isolates per-test faults.

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod report;
pub mod rules;
pub mod similarity;

pub use analysis::{FlakyAnalysis, Reason};
pub use config::Thresholds;
pub use engine::{AnalysisOutcome, AnalyzedTest, Analyzer};
pub use model::{AggregatedTestResult, RunAttempt, TestStatus};
