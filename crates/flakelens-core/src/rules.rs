//! Diagnostic rules: turn extracted features into reason tags.
//!
//! | Group                 | Reads                                   |
//! |-----------------------|-----------------------------------------|
//! | base heuristics       | timing, error summary, hints, attachments |
//! | log differencing      | passed vs failed attempt console lines  |
//! | error diversity       | unique error messages vs failed count   |
//! | log similarity        | per-failed-attempt log sets             |
//!
//! Groups are independent and only ever add tags.

use crate::analysis::Reason;
use crate::config::Thresholds;
use crate::extract::{Features, TIMEOUT_ERROR_TYPE};
use crate::model::AggregatedTestResult;
use crate::normalize::extract_log_lines;
use crate::similarity::average_pairwise_jaccard;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref ELEMENT_STATE: Regex =
        Regex::new(r"(?i)expect.*(to (be|have) (visible|enabled|editable|checked)|to exist)")
            .unwrap();
    static ref SELECTOR: Regex = Regex::new(
        r"(?i)selector|locator|element (is )?not found|detached from document|no element found for selector"
    )
    .unwrap();
    static ref NAVIGATION: Regex = Regex::new(r"(?i)navigation|frame navigated|net::ERR_").unwrap();
}

pub fn diagnose(
    record: &AggregatedTestResult,
    features: &Features,
    cfg: &Thresholds,
) -> BTreeSet<Reason> {
    let mut reasons = BTreeSet::new();
    apply_base_heuristics(features, &mut reasons);
    analyze_log_differences(record, cfg, &mut reasons);
    analyze_error_consistency(features, cfg, &mut reasons);
    analyze_log_consistency(&features.failed_log_sets, cfg, &mut reasons);
    reasons
}

fn any_message(features: &Features, re: &Regex) -> bool {
    features.error_summary.messages.iter().any(|m| re.is_match(m))
}

pub fn apply_base_heuristics(features: &Features, reasons: &mut BTreeSet<Reason>) {
    let attachments = &features.relevant_attachments;

    if features.timing.duration_variance_high {
        reasons.insert(Reason::TimingSensitivity);
    }
    if features
        .error_summary
        .types
        .iter()
        .any(|t| t == TIMEOUT_ERROR_TYPE)
    {
        reasons.insert(Reason::TimeoutIssues);
        if !attachments.failed_traces.is_empty() {
            reasons.insert(Reason::TimeoutReviewTrace);
        }
    }
    if any_message(features, &ELEMENT_STATE) {
        reasons.insert(Reason::ElementState);
    }
    if any_message(features, &SELECTOR) {
        reasons.insert(Reason::SelectorIssues);
    }
    if any_message(features, &NAVIGATION) {
        reasons.insert(Reason::NavigationOrNetwork);
    }
    if !features.console_output_hints.is_empty() {
        reasons.insert(Reason::CheckApplicationLogs);
    }
    if !attachments.failed_traces.is_empty() {
        reasons.insert(Reason::ReviewTrace);
    }
    if !attachments.failed_screenshots.is_empty() {
        reasons.insert(Reason::ReviewScreenshots);
    }
    if !attachments.failed_videos.is_empty() {
        reasons.insert(Reason::ReviewVideos);
    }
}

/// Share of failed-run log lines never seen in a passing run.
pub fn analyze_log_differences(
    record: &AggregatedTestResult,
    cfg: &Thresholds,
    reasons: &mut BTreeSet<Reason>,
) {
    let passed = record.passed_attempts();
    let failed = record.failed_attempts();
    if passed.is_empty() || failed.is_empty() {
        return;
    }

    let passed_lines = extract_log_lines(passed);
    let failed_lines = extract_log_lines(failed);
    if failed_lines.is_empty() {
        return;
    }

    let unique_to_failed = failed_lines.difference(&passed_lines).count();
    let diff_ratio = unique_to_failed as f64 / failed_lines.len() as f64;
    if diff_ratio > cfg.log_diff_ratio && unique_to_failed > cfg.log_diff_min_unique_lines {
        reasons.insert(Reason::SignificantLogDifferences);
    }
}

pub fn analyze_error_consistency(
    features: &Features,
    cfg: &Thresholds,
    reasons: &mut BTreeSet<Reason>,
) {
    let failed = features.failed_attempt_count();
    if failed <= 1 {
        return;
    }

    let unique = features.error_summary.messages.len();
    let diverse_floor = failed as f64 * cfg.error_diversity_ratio;
    if unique == 1 {
        reasons.insert(Reason::ConsistentErrorMessages);
    } else if unique > 1 && (unique as f64) < diverse_floor {
        reasons.insert(Reason::SomewhatDiverseErrorMessages);
    } else if unique as f64 >= diverse_floor && unique > 0 {
        reasons.insert(Reason::HighlyDiverseErrorMessages);
    }
}

pub fn analyze_log_consistency(
    failed_log_sets: &[BTreeSet<String>],
    cfg: &Thresholds,
    reasons: &mut BTreeSet<Reason>,
) {
    let Some(avg) = average_pairwise_jaccard(failed_log_sets) else {
        return;
    };

    if avg > cfg.consistent_log_similarity {
        reasons.insert(Reason::ConsistentLogPattern);
    } else if avg < cfg.diverse_log_similarity && failed_log_sets.iter().any(|s| !s.is_empty()) {
        reasons.insert(Reason::DiverseLogPattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::model::{Attachment, RunAttempt, TestStatus};

    fn record(attempts: Vec<RunAttempt>) -> AggregatedTestResult {
        AggregatedTestResult {
            id: "t".into(),
            title: "t".into(),
            location: "a.spec.ts:1:1".into(),
            final_status: TestStatus::Passed,
            is_flaky: true,
            attempts,
        }
    }

    fn reasons_for(attempts: Vec<RunAttempt>) -> BTreeSet<Reason> {
        let rec = record(attempts);
        let cfg = Thresholds::default();
        let features = extract(&rec, &cfg).unwrap();
        diagnose(&rec, &features, &cfg)
    }

    fn lines(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn message_patterns() {
        let r = reasons_for(vec![
            RunAttempt::new(0, TestStatus::Failed, 1.0)
                .with_error("expect(locator).toBeVisible() failed\nexpected to be visible"),
            RunAttempt::new(1, TestStatus::Failed, 1.0)
                .with_error("page.goto: net::ERR_CONNECTION_REFUSED"),
            RunAttempt::new(2, TestStatus::Passed, 1.0),
        ]);
        assert!(r.contains(&Reason::ElementState));
        assert!(r.contains(&Reason::SelectorIssues));
        assert!(r.contains(&Reason::NavigationOrNetwork));
        assert!(!r.contains(&Reason::TimeoutIssues));
    }

    #[test]
    fn element_detached_is_selector_issue() {
        let r = reasons_for(vec![
            RunAttempt::new(0, TestStatus::Failed, 1.0)
                .with_error("Element is not attached: detached from document"),
            RunAttempt::new(1, TestStatus::Passed, 1.0),
        ]);
        assert!(r.contains(&Reason::SelectorIssues));
        assert!(!r.contains(&Reason::ElementState));
    }

    #[test]
    fn timeout_with_trace() {
        let r = reasons_for(vec![
            RunAttempt::new(0, TestStatus::TimedOut, 1.0)
                .with_error("Test timeout of 30000ms exceeded.")
                .with_attachment(Attachment::new("trace", "application/zip", Some("/t.zip"))),
            RunAttempt::new(1, TestStatus::Passed, 1.0),
        ]);
        assert!(r.contains(&Reason::TimeoutIssues));
        assert!(r.contains(&Reason::TimeoutReviewTrace));
        assert!(r.contains(&Reason::ReviewTrace));
        assert!(!r.contains(&Reason::ReviewScreenshots));
    }

    #[test]
    fn trace_without_timeout_only_suggests_review() {
        let r = reasons_for(vec![
            RunAttempt::new(0, TestStatus::Failed, 1.0)
                .with_error("boom")
                .with_attachment(Attachment::new("trace", "application/zip", Some("/t.zip")))
                .with_attachment(Attachment::new("shot", "image/png", Some("/s.png")))
                .with_attachment(Attachment::new("rec", "video/webm", Some("/v.webm"))),
            RunAttempt::new(1, TestStatus::Passed, 1.0),
        ]);
        assert!(!r.contains(&Reason::TimeoutReviewTrace));
        assert!(r.contains(&Reason::ReviewTrace));
        assert!(r.contains(&Reason::ReviewScreenshots));
        assert!(r.contains(&Reason::ReviewVideos));
    }

    #[test]
    fn console_hint_suggests_logs() {
        let r = reasons_for(vec![
            RunAttempt::new(0, TestStatus::Failed, 1.0).with_stderr("TypeError: x is undefined"),
            RunAttempt::new(1, TestStatus::Passed, 1.0),
        ]);
        assert!(r.contains(&Reason::CheckApplicationLogs));
    }

    #[test]
    fn log_differences_flagged() {
        let r = reasons_for(vec![
            RunAttempt::new(0, TestStatus::Failed, 1.0)
                .with_stdout("boot\ncache miss\nretrying db\nconnection reset"),
            RunAttempt::new(1, TestStatus::Passed, 1.0).with_stdout("boot\nall good"),
        ]);
        // 3 of 4 failure lines unseen in the passing run
        assert!(r.contains(&Reason::SignificantLogDifferences));
    }

    #[test]
    fn log_differences_need_more_than_two_unique_lines() {
        let r = reasons_for(vec![
            RunAttempt::new(0, TestStatus::Failed, 1.0).with_stdout("boot\ncache miss\nretrying"),
            RunAttempt::new(1, TestStatus::Passed, 1.0).with_stdout("boot"),
        ]);
        assert!(!r.contains(&Reason::SignificantLogDifferences));
    }

    fn shared_and_unique_logs(shared: usize, unique: usize) -> BTreeSet<Reason> {
        let shared_lines: Vec<String> = (0..shared).map(|i| format!("shared {i}")).collect();
        let unique_lines: Vec<String> = (0..unique).map(|i| format!("only failed {i}")).collect();
        let failed_out = shared_lines
            .iter()
            .chain(unique_lines.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        reasons_for(vec![
            RunAttempt::new(0, TestStatus::Failed, 1.0).with_stdout(&failed_out),
            RunAttempt::new(1, TestStatus::Passed, 1.0).with_stdout(&shared_lines.join("\n")),
        ])
    }

    #[test]
    fn log_differences_ratio_must_exceed_threshold() {
        // 3 of 10 failure lines unseen when passing: ratio exactly 0.3
        let r = shared_and_unique_logs(7, 3);
        assert!(!r.contains(&Reason::SignificantLogDifferences));
        // 4 of 11
        let r = shared_and_unique_logs(7, 4);
        assert!(r.contains(&Reason::SignificantLogDifferences));
        // many unique lines but a small share: 3 of 20
        let r = shared_and_unique_logs(17, 3);
        assert!(!r.contains(&Reason::SignificantLogDifferences));
    }

    #[test]
    fn log_differences_skipped_when_failures_silent() {
        let r = reasons_for(vec![
            RunAttempt::new(0, TestStatus::Failed, 1.0),
            RunAttempt::new(1, TestStatus::Passed, 1.0).with_stdout("a\nb\nc\nd"),
        ]);
        assert!(!r.contains(&Reason::SignificantLogDifferences));
    }

    fn features_with(messages: usize, failed: usize) -> Features {
        let rec = record(vec![RunAttempt::new(0, TestStatus::Failed, 1.0)]);
        let mut f = extract(&rec, &Thresholds::default()).unwrap();
        f.error_summary.messages = (0..messages).map(|i| format!("m{i}")).collect();
        f.failed_log_sets = vec![BTreeSet::new(); failed];
        f
    }

    fn consistency(messages: usize, failed: usize) -> BTreeSet<Reason> {
        let mut r = BTreeSet::new();
        analyze_error_consistency(&features_with(messages, failed), &Thresholds::default(), &mut r);
        r
    }

    #[test]
    fn error_diversity_bands() {
        assert_eq!(
            consistency(1, 3).into_iter().collect::<Vec<_>>(),
            vec![Reason::ConsistentErrorMessages]
        );
        // 2 < 0.7 * 10
        assert!(consistency(2, 10).contains(&Reason::SomewhatDiverseErrorMessages));
        // 3 >= 0.7 * 4
        assert!(consistency(3, 4).contains(&Reason::HighlyDiverseErrorMessages));
        assert!(consistency(2, 2).contains(&Reason::HighlyDiverseErrorMessages));
        assert!(consistency(0, 3).is_empty());
        assert!(consistency(1, 1).is_empty());
    }

    fn similarity(sets: Vec<BTreeSet<String>>) -> BTreeSet<Reason> {
        let mut r = BTreeSet::new();
        analyze_log_consistency(&sets, &Thresholds::default(), &mut r);
        r
    }

    #[test]
    fn similar_failure_logs_are_consistent() {
        let r = similarity(vec![lines(&["a", "b"]), lines(&["a", "b"]), lines(&["a", "b"])]);
        assert!(r.contains(&Reason::ConsistentLogPattern));
    }

    #[test]
    fn silent_failures_are_consistent() {
        let r = similarity(vec![BTreeSet::new(), BTreeSet::new()]);
        assert!(r.contains(&Reason::ConsistentLogPattern));
    }

    #[test]
    fn disjoint_failure_logs_are_diverse() {
        let r = similarity(vec![lines(&["a"]), lines(&["b"]), lines(&["c"])]);
        assert!(r.contains(&Reason::DiverseLogPattern));
    }

    #[test]
    fn ambiguous_similarity_is_silent() {
        // {a,b,c} vs {b,c,d} = 0.5
        let r = similarity(vec![lines(&["a", "b", "c"]), lines(&["b", "c", "d"])]);
        assert!(r.is_empty());
    }

    #[test]
    fn single_failure_skips_similarity() {
        assert!(similarity(vec![lines(&["a"])]).is_empty());
    }
}
