use crate::analysis::FlakyAnalysis;
use crate::engine::{AnalysisOutcome, AnalyzedTest};
use crate::report::flaky_count;

#[must_use]
pub fn format_header(total: usize, flaky: usize) -> String {
    let detail = if flaky > 0 {
        format!("{} flaky test(s) detected.", flaky)
    } else {
        "No flaky tests detected.".to_string()
    };
    format!("{} total tests analyzed. {}", total, detail)
}

fn analysis_lines(a: &FlakyAnalysis) -> Vec<String> {
    let mut lines = Vec::new();

    if a.potential_reasons.is_empty() {
        lines.push("  Potential reasons: none identified".to_string());
    } else {
        lines.push("  Potential reasons:".to_string());
        lines.extend(a.potential_reasons.iter().map(|r| format!("    - {}", r)));
    }

    let t = &a.timing;
    lines.push(format!(
        "  Duration range (ms): {} - {}",
        t.min_duration_ms, t.max_duration_ms
    ));
    lines.push(format!("  Average duration (ms): {:.0}", t.avg_duration_ms));
    if let Some(p) = t.passed_avg_duration_ms {
        lines.push(format!("  Avg passed duration (ms): {:.0}", p));
    }
    if let Some(f) = t.failed_avg_duration_ms {
        lines.push(format!("  Avg failed duration (ms): {:.0}", f));
    }
    if t.duration_variance_high {
        lines.push("  ⚠️  High duration variance between passed and failed runs".to_string());
    }

    let e = &a.error_summary;
    if e.count > 0 {
        let types = if e.types.is_empty() {
            "None".to_string()
        } else {
            e.types.join(", ")
        };
        lines.push(format!("  Error summary ({}): {}", e.count, types));
        for msg in &e.messages {
            let first = msg.lines().next().unwrap_or_default();
            lines.push(format!("    > {}", first));
        }
    }

    lines.extend(
        a.console_output_hints
            .iter()
            .map(|hint| format!("  Console: {}", hint)),
    );

    let att = &a.relevant_attachments;
    let mut parts = Vec::new();
    if !att.failed_traces.is_empty() {
        parts.push(format!("{} Trace(s)", att.failed_traces.len()));
    }
    if !att.failed_videos.is_empty() {
        parts.push(format!("{} Video(s)", att.failed_videos.len()));
    }
    if !att.failed_screenshots.is_empty() {
        parts.push(format!("{} Screenshot(s)", att.failed_screenshots.len()));
    }
    if !parts.is_empty() {
        lines.push(format!("  Attachments: {}", parts.join(", ")));
    }
    lines
}

#[must_use]
pub fn render_summary(results: &[AnalyzedTest]) -> String {
    let mut lines = vec![format_header(results.len(), flaky_count(results))];

    for test in results.iter().filter(|t| t.record.is_flaky) {
        let r = &test.record;
        lines.push(String::new());
        lines.push(format!(
            "🔁 {}  ({})  final: {}, attempts: {}",
            r.title,
            r.location,
            r.final_status,
            r.attempts.len()
        ));
        match &test.outcome {
            AnalysisOutcome::Analyzed(a) => lines.extend(analysis_lines(a)),
            AnalysisOutcome::Unavailable { reason } => {
                lines.push(format!("  analysis unavailable: {}", reason));
            }
            AnalysisOutcome::NotFlaky => {}
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn print_summary(results: &[AnalyzedTest]) {
    print!("{}", render_summary(results));
}
