//! Feature extraction: one pass over a record's attempts.
//!
//! Produces timing statistics, the error summary, console hints and the
//! failure attachments, plus the per-failed-attempt log sets consumed by
//! the log-similarity rule.

use crate::analysis::{ErrorSummary, RelevantAttachments, TimingStats, CONSOLE_ERRORS_HINT};
use crate::config::Thresholds;
use crate::errors::AnalysisError;
use crate::model::{AggregatedTestResult, Attachment, RunAttempt};
use crate::normalize::extract_log_lines;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

pub const TIMEOUT_ERROR_TYPE: &str = "TimeoutError";
const DEFAULT_ERROR_TYPE: &str = "Error";
const TRACE_ATTACHMENT_NAME: &str = "trace";

lazy_static! {
    static ref CONSOLE_PROBLEM: Regex = Regex::new(r"(?i)error|warning|failed|exception").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub error_summary: ErrorSummary,
    pub timing: TimingStats,
    pub console_output_hints: Vec<String>,
    pub relevant_attachments: RelevantAttachments,
    /// Normalized log lines of each failed attempt, in attempt order.
    pub failed_log_sets: Vec<BTreeSet<String>>,
}

impl Features {
    pub fn failed_attempt_count(&self) -> usize {
        self.failed_log_sets.len()
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn validate(record: &AggregatedTestResult) -> Result<(), AnalysisError> {
    if record.attempts.is_empty() {
        return Err(AnalysisError::NoAttempts {
            test_id: record.id.clone(),
        });
    }
    for a in &record.attempts {
        if !a.duration.is_finite() || a.duration < 0.0 {
            return Err(AnalysisError::InvalidDuration {
                test_id: record.id.clone(),
                attempt: a.attempt,
                duration: a.duration,
            });
        }
    }
    Ok(())
}

/// First `max_lines` lines of the message, and its type label.
///
/// The label is the runner's `value`, defaulting to `Error` when absent or
/// blank; any mention of "timeout" in the full message forces `TimeoutError`.
pub fn summarize_error(message: &str, value: Option<&str>, max_lines: usize) -> (String, String) {
    let lines: Vec<&str> = message.split('\n').collect();
    let short = lines[..lines.len().min(max_lines)].join("\n");
    let kind = if lines.join(" ").to_lowercase().contains("timeout") {
        TIMEOUT_ERROR_TYPE.to_string()
    } else {
        value
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_ERROR_TYPE)
            .to_string()
    };
    (short, kind)
}

fn classify_attachment(att: &Attachment, out: &mut RelevantAttachments) {
    let Some(path) = att.path.as_ref() else {
        return;
    };
    if att.name == TRACE_ATTACHMENT_NAME {
        out.failed_traces.push(path.clone());
    } else if att.content_type.starts_with("image/") {
        out.failed_screenshots.push(path.clone());
    } else if att.content_type.starts_with("video/") {
        out.failed_videos.push(path.clone());
    }
}

fn console_has_problems(attempt: &RunAttempt) -> bool {
    let output = attempt
        .console_chunks()
        .map(|c| c.to_lossy_string())
        .collect::<Vec<_>>()
        .join("\n");
    CONSOLE_PROBLEM.is_match(&output)
}

pub fn extract(record: &AggregatedTestResult, cfg: &Thresholds) -> Result<Features, AnalysisError> {
    validate(record)?;

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut all = Vec::with_capacity(record.attempts.len());
    let mut passed = Vec::new();
    let mut failed = Vec::new();

    let mut error_summary = ErrorSummary::default();
    let mut relevant_attachments = RelevantAttachments::default();
    let mut console_output_hints = Vec::new();
    let mut failed_log_sets = Vec::new();

    for attempt in &record.attempts {
        min = min.min(attempt.duration);
        max = max.max(attempt.duration);
        all.push(attempt.duration);

        if attempt.status.is_passed() {
            passed.push(attempt.duration);
            continue;
        }
        if !attempt.status.is_failure() {
            continue;
        }

        failed.push(attempt.duration);
        failed_log_sets.push(extract_log_lines([attempt]));

        if let Some(err) = &attempt.error {
            error_summary.count += 1;
            let (short, kind) = summarize_error(
                err.message_or_unknown(),
                err.value.as_deref(),
                cfg.error_message_max_lines,
            );
            push_unique(&mut error_summary.messages, short);
            push_unique(&mut error_summary.types, kind);
        }

        for att in &attempt.attachments {
            classify_attachment(att, &mut relevant_attachments);
        }

        if console_has_problems(attempt) {
            push_unique(&mut console_output_hints, CONSOLE_ERRORS_HINT.to_string());
        }
    }

    let duration_variance_high = all.len() > 1
        && !passed.is_empty()
        && !failed.is_empty()
        && max > min * cfg.duration_variance_factor;

    let timing = TimingStats {
        min_duration_ms: min,
        max_duration_ms: max,
        avg_duration_ms: mean(&all).unwrap_or(0.0),
        passed_avg_duration_ms: mean(&passed),
        failed_avg_duration_ms: mean(&failed),
        duration_variance_high,
    };

    Ok(Features {
        error_summary,
        timing,
        console_output_hints,
        relevant_attachments,
        failed_log_sets,
    })
}
