//! Groups per-retry attempt events into one record per test.

use crate::errors::ReportError;
use crate::model::{AggregatedTestResult, RunAttempt, TestStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One finished retry, as emitted by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptEvent {
    pub test_id: String,
    pub title: String,
    pub location: String,
    #[serde(flatten)]
    pub attempt: RunAttempt,
}

/// Overall status of the whole test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Passed,
    Failed,
    Timedout,
    Interrupted,
}

/// Flaky: at least two attempts, one passed, one failed or timed out.
pub fn is_flaky(attempts: &[RunAttempt]) -> bool {
    attempts.len() > 1
        && attempts.iter().any(|a| a.status.is_passed())
        && attempts.iter().any(|a| a.status.is_failure())
}

#[derive(Debug, Default)]
pub struct TestRunLog {
    results: Vec<AggregatedTestResult>,
    index: HashMap<String, usize>,
}

impl TestRunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&mut self, event: AttemptEvent) {
        let idx = match self.index.get(&event.test_id) {
            Some(&idx) => idx,
            None => {
                self.results.push(AggregatedTestResult {
                    id: event.test_id.clone(),
                    title: event.title,
                    location: event.location,
                    final_status: TestStatus::Skipped,
                    is_flaky: false,
                    attempts: Vec::new(),
                });
                self.index.insert(event.test_id, self.results.len() - 1);
                self.results.len() - 1
            }
        };

        let result = &mut self.results[idx];
        result.final_status = event.attempt.status;
        result.attempts.push(event.attempt);
        result.is_flaky = is_flaky(&result.attempts);
    }

    pub fn results(&self) -> &[AggregatedTestResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<AggregatedTestResult> {
        self.results
    }

    pub fn flaky_tests(&self) -> Vec<&AggregatedTestResult> {
        self.results.iter().filter(|r| r.is_flaky).collect()
    }

    /// Parses JSON Lines of attempt events; blank lines are skipped.
    pub fn from_jsonl(raw: &str) -> Result<Self, ReportError> {
        let mut log = Self::new();
        for (i, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let event: AttemptEvent = serde_json::from_str(line)
                .map_err(|source| ReportError::Event { line: i + 1, source })?;
            log.record_attempt(event);
        }
        Ok(log)
    }

    pub fn save_report(&self, out: &Path) -> anyhow::Result<()> {
        tracing::info!("Total tests analyzed: {}", self.results.len());
        tracing::info!("Flaky tests detected in this run: {}", self.flaky_tests().len());
        crate::report::json::write_records(&self.results, out)?;
        tracing::info!("Report saved to {}", out.display());
        Ok(())
    }

    /// Warns about flaky tests unless the run itself already failed.
    pub fn on_run_end(&self, status: RunStatus) -> usize {
        let flaky = self.flaky_tests().len();
        if flaky > 0 && status == RunStatus::Passed {
            tracing::warn!("{} flaky tests were detected during this run!", flaky);
        }
        flaky
    }
}
