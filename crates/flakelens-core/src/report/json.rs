use crate::analysis::{ErrorSummary, FlakyAnalysis, TimingStats};
use crate::engine::{AnalysisOutcome, AnalyzedTest};
use crate::model::AggregatedTestResult;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentsView<'a> {
    failed_traces: &'a [String],
    failed_traces_count: usize,
    failed_screenshots: &'a [String],
    failed_screenshots_count: usize,
    failed_videos: &'a [String],
    failed_videos_count: usize,
}

/// Analysis without the identity fields already present on the record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisView<'a> {
    potential_reasons: Vec<&'static str>,
    error_summary: &'a ErrorSummary,
    timing: &'a TimingStats,
    console_output_hints: &'a [String],
    relevant_attachments: AttachmentsView<'a>,
}

impl<'a> From<&'a FlakyAnalysis> for AnalysisView<'a> {
    fn from(a: &'a FlakyAnalysis) -> Self {
        let att = &a.relevant_attachments;
        Self {
            potential_reasons: a.reason_labels(),
            error_summary: &a.error_summary,
            timing: &a.timing,
            console_output_hints: &a.console_output_hints,
            relevant_attachments: AttachmentsView {
                failed_traces: &att.failed_traces,
                failed_traces_count: att.failed_traces.len(),
                failed_screenshots: &att.failed_screenshots,
                failed_screenshots_count: att.failed_screenshots.len(),
                failed_videos: &att.failed_videos,
                failed_videos_count: att.failed_videos.len(),
            },
        }
    }
}

/// One record plus its analysis, as served to the dashboard.
pub fn test_to_value(test: &AnalyzedTest) -> serde_json::Result<serde_json::Value> {
    let mut v = serde_json::to_value(&test.record)?;
    match &test.outcome {
        AnalysisOutcome::Analyzed(a) => {
            v["analysis"] = serde_json::to_value(AnalysisView::from(a))?;
        }
        AnalysisOutcome::Unavailable { reason } => {
            v["analysisUnavailable"] = serde_json::json!(reason);
        }
        AnalysisOutcome::NotFlaky => {}
    }
    Ok(v)
}

pub fn to_json(results: &[AnalyzedTest]) -> serde_json::Result<String> {
    let values = results
        .iter()
        .map(test_to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;
    serde_json::to_string_pretty(&values)
}

pub fn write_json(results: &[AnalyzedTest], out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, to_json(results)?)?;
    Ok(())
}

/// Writes aggregated records (no analysis), creating parent directories.
pub fn write_records(records: &[AggregatedTestResult], out: &Path) -> anyhow::Result<()> {
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(out, serde_json::to_string_pretty(records)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Analyzer;
    use crate::model::{Attachment, RunAttempt, TestStatus};

    fn flaky_record() -> AggregatedTestResult {
        AggregatedTestResult {
            id: "t1".into(),
            title: "checkout".into(),
            location: "shop.spec.ts:10:3".into(),
            final_status: TestStatus::Passed,
            is_flaky: true,
            attempts: vec![
                RunAttempt::new(0, TestStatus::Failed, 50.0)
                    .with_error("Timeout 5000ms exceeded")
                    .with_attachment(Attachment::new("trace", "application/zip", Some("/t.zip"))),
                RunAttempt::new(1, TestStatus::Passed, 600.0),
            ],
        }
    }

    #[test]
    fn analysis_block_has_counts_and_reason_labels() {
        let results = Analyzer::default().analyze_report(&[flaky_record()]);
        let v = test_to_value(&results[0]).unwrap();
        assert_eq!(v["id"], "t1");
        assert_eq!(v["isFlaky"], true);
        let a = &v["analysis"];
        assert!(a.get("testId").is_none());
        assert_eq!(a["relevantAttachments"]["failedTracesCount"], 1);
        assert_eq!(a["relevantAttachments"]["failedVideosCount"], 0);
        assert_eq!(a["timing"]["durationVarianceHigh"], true);
        assert_eq!(a["timing"]["passedAvgDurationMs"], 600.0);
        assert_eq!(a["errorSummary"]["types"][0], "TimeoutError");
        let reasons: Vec<&str> = a["potentialReasons"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r.as_str())
            .collect();
        assert!(reasons.contains(&"Potential Timeout Issues (Waits/Performance)"));
    }

    #[test]
    fn non_flaky_and_unavailable_have_no_analysis() {
        let mut stable = flaky_record();
        stable.is_flaky = false;
        let mut broken = flaky_record();
        broken.attempts.clear();
        let results = Analyzer::default().analyze_report(&[stable, broken]);
        let v0 = test_to_value(&results[0]).unwrap();
        assert!(v0.get("analysis").is_none());
        assert!(v0.get("analysisUnavailable").is_none());
        let v1 = test_to_value(&results[1]).unwrap();
        assert!(v1.get("analysis").is_none());
        assert!(v1["analysisUnavailable"]
            .as_str()
            .unwrap()
            .contains("no attempts"));
    }

    #[test]
    fn write_json_produces_array() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("analysis.json");
        let results = Analyzer::default().analyze_report(&[flaky_record()]);
        write_json(&results, &out).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 1);
    }
}
