//! Structured logging setup
//!
//! Events go to stderr so commands that print results (`arbor variables`,
//! `arbor tools`) keep stdout machine-readable. `RUST_LOG` directives are
//! honoured on top of the configured level. Only the first initialization
//! takes effect.
//!
//! ```no_run
//! use arbor::util::logging;
//!
//! // ARBOR_LOG_LEVEL=debug ARBOR_LOG_JSON=true
//! logging::init_from_env();
//! tracing::info!(tool = "compile", "Running tool");
//! ```

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ArborConfig;

static INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level for arbor's own events
    pub level: Level,

    /// One JSON object per line instead of pretty console output
    pub use_json: bool,

    /// Target, source location and thread of every event
    pub include_metadata: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_metadata: false,
        }
    }
}

impl LoggingConfig {
    /// JSON with full metadata, for build agents that collect structured logs
    pub fn ci() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_metadata: true,
        }
    }
}

impl From<&ArborConfig> for LoggingConfig {
    fn from(config: &ArborConfig) -> Self {
        let base = if config.log_json {
            Self::ci()
        } else {
            Self::default()
        };
        Self {
            level: parse_level(&config.log_level),
            ..base
        }
    }
}

/// Case-insensitive level name; anything unknown is `INFO`.
///
/// ```
/// use arbor::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level: &str) -> Level {
    level.trim().parse::<Level>().unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level
        );
        Level::INFO
    })
}

pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = format!("arbor={}", config.level).parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        let metadata = config.include_metadata;
        let json = config.use_json.then(|| {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(metadata)
                .with_file(metadata)
                .with_line_number(metadata)
                .with_thread_ids(metadata)
        });
        let console = (!config.use_json).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(metadata)
                .with_file(metadata)
                .with_line_number(metadata)
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(json)
            .with(console)
            .init();
    });
}

/// Logging settings from `ARBOR_LOG_LEVEL` and `ARBOR_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    LoggingConfig::from(&ArborConfig::from_env())
}

pub fn init_from_env() {
    init_logging(config_from_env());
}
