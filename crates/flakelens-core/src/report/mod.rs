pub mod console;
pub mod input;
pub mod json;

use crate::engine::AnalyzedTest;

/// Number of tests in `results` flagged flaky by the aggregator.
pub fn flaky_count(results: &[AnalyzedTest]) -> usize {
    results.iter().filter(|t| t.record.is_flaky).count()
}
