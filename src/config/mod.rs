//! Optimizer configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to
//! its default. Each rewrite can be switched off independently.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::observability::Severity;

/// Configuration for the refine and cost passes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Fold filter predicates into index-scan ranges
    #[serde(default = "default_true")]
    pub range_pushdown: bool,

    /// Mark sorts satisfied by index order as bypassed
    #[serde(default = "default_true")]
    pub sort_bypass: bool,

    /// Push limit counts down to index scans as row hints
    #[serde(default = "default_true")]
    pub limit_propagation: bool,

    /// Upper bound on composite ranges per index scan.
    /// Composition stops before a column whose cross product would exceed it.
    #[serde(default = "default_max_index_ranges")]
    pub max_index_ranges: usize,

    /// Minimum log severity: trace, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}
fn default_max_index_ranges() -> usize {
    1024
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            range_pushdown: true,
            sort_bypass: true,
            limit_propagation: true,
            max_index_ranges: default_max_index_ranges(),
            log_level: default_log_level(),
        }
    }
}

impl OptimizerConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: OptimizerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_index_ranges == 0 {
            return Err(ConfigError::invalid("max_index_ranges", "must be > 0"));
        }
        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::invalid(
                "log_level",
                format!("unknown level '{}'", self.log_level),
            ));
        }
        Ok(())
    }

    /// Configured minimum log severity
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Warn)
    }
}
