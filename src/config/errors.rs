//! Configuration error types
//!
//! Error codes:
//! - AERO_OPTIMIZER_CONFIG_IO
//! - AERO_OPTIMIZER_CONFIG_PARSE
//! - AERO_OPTIMIZER_CONFIG_INVALID

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "AERO_OPTIMIZER_CONFIG_IO",
            ConfigError::Parse(_) => "AERO_OPTIMIZER_CONFIG_PARSE",
            ConfigError::Invalid { .. } => "AERO_OPTIMIZER_CONFIG_INVALID",
        }
    }
}
