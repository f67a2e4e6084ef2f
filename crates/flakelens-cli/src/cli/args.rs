use clap::{Parser, Subcommand, ValueEnum};
use flakelens_core::aggregate::RunStatus;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "flakelens",
    version,
    about = "Explain why retried tests behave inconsistently"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Group per-retry attempt events (JSON Lines) into an aggregated report
    Aggregate(AggregateArgs),
    /// Diagnose flaky tests in an aggregated report
    Analyze(AnalyzeArgs),
    Version,
}

#[derive(Parser, Debug)]
pub struct AggregateArgs {
    /// Attempt events, one JSON object per line
    #[arg(long)]
    pub events: PathBuf,

    #[arg(long, default_value = "flaky-report.json")]
    pub out: PathBuf,

    /// Overall run status; flaky warnings are suppressed for failed runs
    #[arg(long, value_enum, default_value = "passed")]
    pub run_status: RunStatusArg,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    #[arg(long, default_value = "flaky-report.json")]
    pub report: PathBuf,

    /// Thresholds file (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "console")]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exit with code 1 when any flaky test is present
    #[arg(long)]
    pub fail_on_flaky: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunStatusArg {
    Passed,
    Failed,
    Timedout,
    Interrupted,
}

impl From<RunStatusArg> for RunStatus {
    fn from(s: RunStatusArg) -> Self {
        match s {
            RunStatusArg::Passed => RunStatus::Passed,
            RunStatusArg::Failed => RunStatus::Failed,
            RunStatusArg::Timedout => RunStatus::Timedout,
            RunStatusArg::Interrupted => RunStatus::Interrupted,
        }
    }
}
