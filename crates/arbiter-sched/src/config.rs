//! Scheduler Configuration
//!
//! Budget and seed tuning loaded from a TOML file so deployments can
//! adjust per-tick budgets without recompiling.

use serde::{Deserialize, Serialize};
use std::path::Path;

use thiserror::Error;

/// Tuning for the two-lane scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Per-tick budget for the think lane, in milliseconds.
    pub think_budget_ms: f64,
    /// Per-tick budget for the update lane, in milliseconds.
    pub update_budget_ms: f64,
    /// Seed for jitter sampling; the update lane derives its own stream
    /// from it.
    pub seed: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            think_budget_ms: 0.25,
            update_budget_ms: 1.0,
            seed: 42,
        }
    }
}

impl SchedulerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
