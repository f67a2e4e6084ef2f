//! Heuristic thresholds for the diagnosis rules.
//!
//! Defaults are the tuned values; a YAML file may override any subset:
//!
//! ```yaml
//! version: 1
//! thresholds:
//!   error_diversity_ratio: 0.7
//! ```

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Lines of an error message kept as its dedup key.
    pub error_message_max_lines: usize,
    /// High variance when max duration exceeds this multiple of min duration.
    pub duration_variance_factor: f64,
    /// Share of failure-only log lines above which logs count as divergent.
    pub log_diff_ratio: f64,
    /// Failure-only line count must exceed this as well.
    pub log_diff_min_unique_lines: usize,
    /// Unique messages at or above this share of failed attempts are "highly diverse".
    pub error_diversity_ratio: f64,
    /// Average pairwise similarity above this is a consistent log pattern.
    pub consistent_log_similarity: f64,
    /// Average pairwise similarity below this is a diverse log pattern.
    pub diverse_log_similarity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            error_message_max_lines: 5,
            duration_variance_factor: 2.0,
            log_diff_ratio: 0.3,
            log_diff_min_unique_lines: 2,
            error_diversity_ratio: 0.7,
            consistent_log_similarity: 0.7,
            diverse_log_similarity: 0.3,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.error_message_max_lines == 0 {
            return Err(ConfigError::InvalidThreshold {
                name: "error_message_max_lines",
                detail: "must be at least 1".into(),
            });
        }
        if !self.duration_variance_factor.is_finite() || self.duration_variance_factor < 1.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "duration_variance_factor",
                detail: format!("must be >= 1.0, got {}", self.duration_variance_factor),
            });
        }
        for (name, v) in [
            ("log_diff_ratio", self.log_diff_ratio),
            ("error_diversity_ratio", self.error_diversity_ratio),
            ("consistent_log_similarity", self.consistent_log_similarity),
            ("diverse_log_similarity", self.diverse_log_similarity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::InvalidThreshold {
                    name,
                    detail: format!("must be within [0, 1], got {}", v),
                });
            }
        }
        if self.diverse_log_similarity > self.consistent_log_similarity {
            return Err(ConfigError::InvalidThreshold {
                name: "diverse_log_similarity",
                detail: format!(
                    "must not exceed consistent_log_similarity ({} > {})",
                    self.diverse_log_similarity, self.consistent_log_similarity
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosisConfig {
    pub version: u32,
    #[serde(default)]
    pub thresholds: Thresholds,
}

pub fn parse_config(raw: &str) -> Result<Thresholds, ConfigError> {
    let cfg: DiagnosisConfig = serde_yaml::from_str(raw)?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion {
            found: cfg.version,
            supported: SUPPORTED_CONFIG_VERSION,
        });
    }
    cfg.thresholds.validate()?;
    Ok(cfg.thresholds)
}

pub fn load_config(path: &Path) -> Result<Thresholds, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&raw)
}
