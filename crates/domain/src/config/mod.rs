mod long_term;
mod store;
mod working_memory;

pub use long_term::*;
pub use store::*;
pub use working_memory::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub working_memory: WorkingMemoryConfig,
    #[serde(default)]
    pub long_term: LongTermConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        match &self.store.redis_url {
            Some(url) if !(url.starts_with("redis://") || url.starts_with("rediss://")) => {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "store.redis_url".into(),
                    message: "must start with redis:// or rediss://".into(),
                });
            }
            Some(_) => {}
            None => {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: "store.redis_url".into(),
                    message: "not set; working memory is kept in process memory only".into(),
                });
            }
        }

        if self.working_memory.reconstruction_default_limit == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "working_memory.reconstruction_default_limit".into(),
                message: "must be greater than 0".into(),
            });
        }

        // The long-term endpoint only matters when reconstruction is on.
        if self.working_memory.reconstruct_from_long_term && self.long_term.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "long_term.base_url".into(),
                message: "base_url must not be empty when reconstruction is enabled".into(),
            });
        }

        if self.long_term.timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "long_term.timeout_ms".into(),
                message: "a zero timeout fails every request".into(),
            });
        }

        if self.long_term.max_retries > MAX_SENSIBLE_RETRIES {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "long_term.max_retries".into(),
                message: format!(
                    "{} retries with back-off can stall a read for minutes; keep it at {} or less",
                    self.long_term.max_retries, MAX_SENSIBLE_RETRIES
                ),
            });
        }

        errors
    }
}

const MAX_SENSIBLE_RETRIES: u32 = 10;
