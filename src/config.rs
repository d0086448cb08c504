//! Configuration management for arbor
//!
//! Settings come from environment variables with sensible defaults. They
//! control the pipeline itself, not the build: build variables are resolved by
//! providers.
//!
//! # Environment Variables
//!
//! - `ARBOR_LOG_LEVEL`: Logging level - default: "info"
//! - `ARBOR_LOG_JSON`: JSON log output (true|false) - default: "false"
//! - `ARBOR_SOURCE_ROOT`: Explicit source root, skips detection - default: unset
//! - `ARBOR_COMPATIBILITY_ALIASES`: Add aliases for legacy variable names - default: "true"
//! - `ARBOR_DUPLICATE_KEYS`: What to do when a provider redefines a variable (allow|reject) - default: "allow"
//! - `ARBOR_DEBUG`: Enable local debug defaults - default: "false"
//! - `ARBOR_SECRET_MARKERS`: Comma separated extra secret markers - default: unset
//! - `ARBOR_TOOL_TIMEOUT`: Timeout in seconds for command tools, 0 disables - default: "0"
//!
//! # Example
//!
//! ```no_run
//! use arbor::ArborConfig;
//!
//! let config = ArborConfig::default();
//! config.validate().expect("Invalid configuration");
//! let pipeline_config = config.to_pipeline_config().expect("Invalid configuration");
//! ```

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::{DuplicateKeyPolicy, PipelineConfig};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_DUPLICATE_KEYS: &str = "allow";
const MAX_TOOL_TIMEOUT_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid duplicate key policy: {0}. Valid options: allow, reject")]
    InvalidDuplicatePolicy(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct ArborConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_json: bool,

    pub source_root: Option<PathBuf>,

    pub compatibility_aliases: bool,

    /// Raw duplicate key policy, checked by [`ArborConfig::validate`]
    pub duplicate_keys: String,

    pub debug: bool,

    pub secret_markers: Vec<String>,

    /// Command timeout in seconds, 0 for none
    pub tool_timeout_secs: u64,
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl Default for ArborConfig {
    /// Loads from `ARBOR_*` environment variables, falling back to defaults
    fn default() -> Self {
        let log_level = env::var("ARBOR_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let source_root = env::var("ARBOR_SOURCE_ROOT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let duplicate_keys = env::var("ARBOR_DUPLICATE_KEYS")
            .unwrap_or_else(|_| DEFAULT_DUPLICATE_KEYS.to_string());

        let secret_markers = env::var("ARBOR_SECRET_MARKERS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let tool_timeout_secs = env::var("ARBOR_TOOL_TIMEOUT")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Self {
            log_level,
            log_json: env_bool("ARBOR_LOG_JSON", false),
            source_root,
            compatibility_aliases: env_bool("ARBOR_COMPATIBILITY_ALIASES", true),
            duplicate_keys,
            debug: env_bool("ARBOR_DEBUG", false),
            secret_markers,
            tool_timeout_secs,
        }
    }
}

impl ArborConfig {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown log level or duplicate key policy,
    /// or a tool timeout above 24 hours
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        self.duplicate_policy()?;

        if self.tool_timeout_secs > MAX_TOOL_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Tool timeout cannot exceed 24 hours".to_string(),
            ));
        }

        Ok(())
    }

    pub fn duplicate_policy(&self) -> Result<DuplicateKeyPolicy, ConfigError> {
        self.duplicate_keys
            .parse()
            .map_err(|_| ConfigError::InvalidDuplicatePolicy(self.duplicate_keys.clone()))
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        (self.tool_timeout_secs > 0).then(|| Duration::from_secs(self.tool_timeout_secs))
    }

    pub fn to_pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        Ok(PipelineConfig::new()
            .with_duplicate_policy(self.duplicate_policy()?)
            .with_compatibility_aliases(self.compatibility_aliases)
            .with_debug_defaults(self.debug)
            .with_tool_timeout(self.tool_timeout())
            .with_secret_markers(self.secret_markers.clone()))
    }
}

impl fmt::Display for ArborConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arbor Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        if let Some(ref root) = self.source_root {
            writeln!(f, "  Source Root: {}", root.display())?;
        }
        writeln!(f, "  Compatibility Aliases: {}", self.compatibility_aliases)?;
        writeln!(f, "  Duplicate Keys: {}", self.duplicate_keys)?;
        writeln!(f, "  Debug Defaults: {}", self.debug)?;
        writeln!(f, "  Tool Timeout: {}s", self.tool_timeout_secs)?;
        Ok(())
    }
}
