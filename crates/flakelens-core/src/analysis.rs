//! Diagnosis output for one flaky test.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

pub const CONSOLE_ERRORS_HINT: &str = "Errors/Warnings in console of failed runs";

/// A diagnosed contributing factor. Serialized as its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reason {
    TimingSensitivity,
    TimeoutIssues,
    TimeoutReviewTrace,
    ElementState,
    SelectorIssues,
    NavigationOrNetwork,
    CheckApplicationLogs,
    ReviewTrace,
    ReviewScreenshots,
    ReviewVideos,
    SignificantLogDifferences,
    ConsistentErrorMessages,
    SomewhatDiverseErrorMessages,
    HighlyDiverseErrorMessages,
    ConsistentLogPattern,
    DiverseLogPattern,
}

impl Reason {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::TimingSensitivity,
            Self::TimeoutIssues,
            Self::TimeoutReviewTrace,
            Self::ElementState,
            Self::SelectorIssues,
            Self::NavigationOrNetwork,
            Self::CheckApplicationLogs,
            Self::ReviewTrace,
            Self::ReviewScreenshots,
            Self::ReviewVideos,
            Self::SignificantLogDifferences,
            Self::ConsistentErrorMessages,
            Self::SomewhatDiverseErrorMessages,
            Self::HighlyDiverseErrorMessages,
            Self::ConsistentLogPattern,
            Self::DiverseLogPattern,
        ]
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TimingSensitivity => "Inconsistent Performance / Timing Sensitivity",
            Self::TimeoutIssues => "Potential Timeout Issues (Waits/Performance)",
            Self::TimeoutReviewTrace => "Timeout occurred: Review network/DOM activity in Trace",
            Self::ElementState => "Element State/Visibility/Availability Issues",
            Self::SelectorIssues => "Selector Issues or Dynamic DOM Structure",
            Self::NavigationOrNetwork => "Navigation Timing or Network Reliability Issues",
            Self::CheckApplicationLogs => "Check Application Logs (Console Output in Failures)",
            Self::ReviewTrace => "Review Trace for Failed Attempts",
            Self::ReviewScreenshots => "Review Screenshots for Failed Attempts",
            Self::ReviewVideos => "Review Video Recordings for Failed Attempts",
            Self::SignificantLogDifferences => {
                "Significant Log Differences between Passed/Failed Runs"
            }
            Self::ConsistentErrorMessages => "Consistent Error Message Pattern in Failures",
            Self::SomewhatDiverseErrorMessages => {
                "Somewhat Diverse Error Messages (Multiple Failure Modes Likely)"
            }
            Self::HighlyDiverseErrorMessages => "Highly Diverse Error Messages (Chaotic Failures)",
            Self::ConsistentLogPattern => "Consistent Log Pattern in Failures",
            Self::DiverseLogPattern => "Diverse Log Pattern in Failures",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSummary {
    /// Failed attempts that carried an error object.
    pub count: usize,
    /// Distinct truncated messages, first-seen order.
    pub messages: Vec<String>,
    /// Distinct type labels, first-seen order.
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    pub avg_duration_ms: f64,
    pub passed_avg_duration_ms: Option<f64>,
    pub failed_avg_duration_ms: Option<f64>,
    pub duration_variance_high: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantAttachments {
    pub failed_traces: Vec<String>,
    pub failed_screenshots: Vec<String>,
    pub failed_videos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlakyAnalysis {
    pub test_id: String,
    pub title: String,
    pub location: String,
    pub potential_reasons: BTreeSet<Reason>,
    pub error_summary: ErrorSummary,
    pub timing: TimingStats,
    pub console_output_hints: Vec<String>,
    pub relevant_attachments: RelevantAttachments,
}

impl FlakyAnalysis {
    pub fn has_reason(&self, reason: Reason) -> bool {
        self.potential_reasons.contains(&reason)
    }

    pub fn reason_labels(&self) -> Vec<&'static str> {
        self.potential_reasons.iter().map(|r| r.label()).collect()
    }
}
