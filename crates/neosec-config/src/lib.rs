// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ambient runtime configuration for NeoSec: concurrency, output caps,
//! timeouts, the data directory, explicit binary path overrides, and the CI
//! severity threshold.
//!
//! Loading is layered: [`NeoSecConfig::default`], then an optional TOML
//! file, then `NEOSEC_*` environment variable overrides — each layer takes
//! precedence over the one before it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use neosec_core::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file does not exist or could not be read.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },
    /// The file's contents could not be parsed as TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },
    /// Semantic validation failed.
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

fn default_max_concurrency() -> usize {
    4
}

fn default_grace_period_secs() -> u64 {
    2
}

fn default_max_output_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_data_dir() -> String {
    "data".to_string()
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NeoSecConfig {
    /// Root directory for persisted run state: `<data_dir>/raw_outputs/<run-id>/`
    /// and `<data_dir>/reports/<run-id>.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Maximum number of tool invocations allowed to run at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Delay between `SIGTERM` and `SIGKILL` when terminating a task.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Cap on retained stdout/stderr bytes per task stream.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// Minimum severity that causes the CLI to exit non-zero on `scan`.
    ///
    /// `None` means no threshold: the run's exit code reflects only whether
    /// every task succeeded, never the severity of what was found. This is
    /// the default — a severity gate is something a caller opts into.
    #[serde(default)]
    pub severity_threshold: Option<Severity>,

    /// Explicit path overrides per binary name, taking precedence over a
    /// `PATH` search (see `neosec_core::BinaryResolution::resolve`).
    #[serde(default)]
    pub binary_paths: BTreeMap<String, String>,
}

impl Default for NeoSecConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_concurrency: default_max_concurrency(),
            grace_period_secs: default_grace_period_secs(),
            max_output_bytes: default_max_output_bytes(),
            severity_threshold: None,
            binary_paths: BTreeMap::new(),
        }
    }
}

impl NeoSecConfig {
    /// Grace period as a [`Duration`].
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// Root directory for raw per-task output.
    pub fn raw_outputs_dir(&self, run_id: &str) -> PathBuf {
        Path::new(&self.data_dir).join("raw_outputs").join(run_id)
    }

    /// Path to the persisted JSON report for a run.
    pub fn report_path(&self, run_id: &str) -> PathBuf {
        Path::new(&self.data_dir)
            .join("reports")
            .join(format!("{run_id}.json"))
    }
}

/// Load configuration from an optional TOML file, then apply environment
/// overrides.
///
/// `path = None` starts from [`NeoSecConfig::default`].
pub fn load_config(path: Option<&Path>) -> Result<NeoSecConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => NeoSecConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`NeoSecConfig`].
pub fn parse_toml(content: &str) -> Result<NeoSecConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError { reason: e.to_string() })
}

/// Recognised environment overrides:
/// - `NEOSEC_DATA_DIR`
/// - `NEOSEC_MAX_CONCURRENCY`
/// - `NEOSEC_GRACE_PERIOD_SECS`
/// - `NEOSEC_MAX_OUTPUT_BYTES`
/// - `NEOSEC_SEVERITY_THRESHOLD`
pub fn apply_env_overrides(config: &mut NeoSecConfig) {
    if let Ok(val) = std::env::var("NEOSEC_DATA_DIR") {
        config.data_dir = val;
    }
    if let Ok(val) = std::env::var("NEOSEC_MAX_CONCURRENCY") {
        if let Ok(n) = val.parse() {
            config.max_concurrency = n;
        }
    }
    if let Ok(val) = std::env::var("NEOSEC_GRACE_PERIOD_SECS") {
        if let Ok(n) = val.parse() {
            config.grace_period_secs = n;
        }
    }
    if let Ok(val) = std::env::var("NEOSEC_MAX_OUTPUT_BYTES") {
        if let Ok(n) = val.parse() {
            config.max_output_bytes = n;
        }
    }
    if let Ok(val) = std::env::var("NEOSEC_SEVERITY_THRESHOLD") {
        config.severity_threshold = parse_severity(&val);
    }
}

fn parse_severity(s: &str) -> Option<Severity> {
    match s.to_ascii_lowercase().as_str() {
        "info" => Some(Severity::Info),
        "low" => Some(Severity::Low),
        "medium" => Some(Severity::Medium),
        "high" => Some(Severity::High),
        "critical" => Some(Severity::Critical),
        _ => None,
    }
}

/// Validate a loaded configuration.
///
/// Returns every problem found rather than stopping at the first.
pub fn validate_config(config: &NeoSecConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    if config.max_concurrency == 0 {
        errors.push("max_concurrency must be at least 1".to_string());
    }
    if config.max_output_bytes == 0 {
        errors.push("max_output_bytes must be greater than zero".to_string());
    }
    if config.data_dir.trim().is_empty() {
        errors.push("data_dir must not be empty".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}
