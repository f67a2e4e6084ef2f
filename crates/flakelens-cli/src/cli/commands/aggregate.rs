//! CLI command: flakelens aggregate
//!
//! Usage:
//!   flakelens aggregate --events attempts.jsonl [--out flaky-report.json] [--run-status failed]

use super::super::args::AggregateArgs;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS};
use flakelens_core::aggregate::TestRunLog;
use flakelens_core::errors::ReportError;

pub async fn run(args: AggregateArgs) -> anyhow::Result<i32> {
    let raw = match tokio::fs::read_to_string(&args.events).await {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("{}", ReportError::from_io(args.events.clone(), e));
            return Ok(CONFIG_ERROR);
        }
    };
    let log = match TestRunLog::from_jsonl(&raw) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(CONFIG_ERROR);
        }
    };

    log.save_report(&args.out)?;
    log.on_run_end(args.run_status.into());
    Ok(SUCCESS)
}
