use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("invalid threshold {name}: {detail}")]
    InvalidThreshold { name: &'static str, detail: String },
}

/// Raised when a record violates the documented shape. Scoped to one test.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("test {test_id} is flagged flaky but has no attempts")]
    NoAttempts { test_id: String },
    #[error("test {test_id} attempt {attempt} has invalid duration {duration}")]
    InvalidDuration {
        test_id: String,
        attempt: u32,
        duration: f64,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse report {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid attempt event on line {line}: {source}")]
    Event {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ReportError {
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ReportError::NotFound(path)
        } else {
            ReportError::Io { path, source }
        }
    }
}
