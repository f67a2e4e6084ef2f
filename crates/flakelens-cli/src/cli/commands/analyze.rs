//! CLI command: flakelens analyze
//!
//! Usage:
//!   flakelens analyze --report flaky-report.json [--format console|json] [-o analysis.json]

use super::super::args::{AnalyzeArgs, OutputFormat};
use crate::exit_codes::{CONFIG_ERROR, FLAKY_DETECTED, SUCCESS};
use anyhow::Context;
use flakelens_core::config::load_config;
use flakelens_core::report::{console, flaky_count, input, json};
use flakelens_core::{Analyzer, Thresholds};

pub async fn run(args: AnalyzeArgs) -> anyhow::Result<i32> {
    let thresholds = match &args.config {
        Some(path) => match load_config(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("config error: {}", e);
                return Ok(CONFIG_ERROR);
            }
        },
        None => Thresholds::default(),
    };

    let records = match input::read_report(&args.report) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(CONFIG_ERROR);
        }
    };

    let results = Analyzer::new(thresholds).analyze_report(&records);
    let flaky = flaky_count(&results);
    tracing::info!("{} tests loaded, {} flaky", results.len(), flaky);

    match (&args.output, args.format) {
        (None, OutputFormat::Console) => console::print_summary(&results),
        (None, OutputFormat::Json) => println!("{}", json::to_json(&results)?),
        (Some(path), OutputFormat::Json) => json::write_json(&results, path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        (Some(path), OutputFormat::Console) => {
            tokio::fs::write(path, console::render_summary(&results))
                .await
                .with_context(|| format!("failed to write {}", path.display()))?
        }
    }
    if let Some(path) = &args.output {
        tracing::info!("Analysis written to {}", path.display());
    }

    if args.fail_on_flaky && flaky > 0 {
        return Ok(FLAKY_DETECTED);
    }
    Ok(SUCCESS)
}
