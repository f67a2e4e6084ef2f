use crate::analysis::FlakyAnalysis;
use crate::config::Thresholds;
use crate::errors::AnalysisError;
use crate::extract::extract;
use crate::model::AggregatedTestResult;
use crate::rules::diagnose;

/// Result of analyzing one aggregated record.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    NotFlaky,
    Analyzed(FlakyAnalysis),
    /// The record could not be analyzed; other tests are unaffected.
    Unavailable { reason: String },
}

impl AnalysisOutcome {
    pub fn analysis(&self) -> Option<&FlakyAnalysis> {
        match self {
            AnalysisOutcome::Analyzed(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedTest {
    pub record: AggregatedTestResult,
    pub outcome: AnalysisOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    thresholds: Thresholds,
}

impl Analyzer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// `Ok(None)` for records not flagged flaky.
    pub fn analyze(
        &self,
        record: &AggregatedTestResult,
    ) -> Result<Option<FlakyAnalysis>, AnalysisError> {
        if !record.is_flaky {
            return Ok(None);
        }

        let features = extract(record, &self.thresholds)?;
        let potential_reasons = diagnose(record, &features, &self.thresholds);

        tracing::debug!(
            test_id = %record.id,
            attempts = record.attempts.len(),
            reasons = potential_reasons.len(),
            "analyzed flaky test"
        );

        Ok(Some(FlakyAnalysis {
            test_id: record.id.clone(),
            title: record.title.clone(),
            location: record.location.clone(),
            potential_reasons,
            error_summary: features.error_summary,
            timing: features.timing,
            console_output_hints: features.console_output_hints,
            relevant_attachments: features.relevant_attachments,
        }))
    }

    pub fn analyze_outcome(&self, record: &AggregatedTestResult) -> AnalysisOutcome {
        match self.analyze(record) {
            Ok(Some(a)) => AnalysisOutcome::Analyzed(a),
            Ok(None) => AnalysisOutcome::NotFlaky,
            Err(e) => {
                tracing::warn!(test_id = %record.id, "error analyzing flaky test: {}", e);
                AnalysisOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Analyzes every record independently, in input order.
    pub fn analyze_report(&self, records: &[AggregatedTestResult]) -> Vec<AnalyzedTest> {
        records
            .iter()
            .map(|record| AnalyzedTest {
                record: record.clone(),
                outcome: self.analyze_outcome(record),
            })
            .collect()
    }
}
