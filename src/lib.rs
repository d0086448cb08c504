//! arbor - convention-driven build runner
//!
//! A build is two strictly sequential stages over one shared set of
//! variables:
//!
//! 1. **Resolution**: variable providers run in ascending `order`. Each sees
//!    everything resolved before it and only defines keys that are still
//!    absent, so explicit overrides always win.
//! 2. **Execution**: build tools run in ascending `priority`. The first failure
//!    skips the remaining tools except those registered `run_always`, which
//!    are reserved for cleanup.
//!
//! Variable keys compare case-insensitively. After resolution, every
//! `Arbor.Build.*` / `Arbor.X.*` key is mirrored under the other prefix and
//! separator so older tooling keeps working.
//!
//! # Example
//!
//! ```no_run
//! use arbor::{BuildContext, BuildPipeline, PipelineConfig, VariableSet};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut context = BuildContext::from_process(PipelineConfig::default())?;
//! let exit_code = BuildPipeline::with_defaults()
//!     .run(&mut context, VariableSet::new(), &[], &CancellationToken::new())
//!     .await?;
//! println!("Build finished with exit code {}", exit_code);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`variables`]: variables, providers, resolution and aliasing
//! - [`tools`]: build tools, registry and the execution state machine
//! - [`pipeline`]: per-run context and orchestration
//! - [`diagnostics`]: redacted snapshots and exit reporting

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod pipeline;
pub mod process;
pub mod progress;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tools;
pub mod util;
pub mod variables;

pub use config::{ArborConfig, ConfigError};
pub use diagnostics::{SecretMatcher, VariableSnapshot};
pub use error::BuildError;
pub use pipeline::{BuildContext, BuildPipeline, DuplicateKeyPolicy, ExitCode, PipelineConfig};
pub use tools::{BuildTool, ToolContext, ToolRegistration, ToolRegistry};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use variables::{
    Variable, VariableError, VariableProvider, VariableSet, ProviderRegistry, ResolveContext,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_arbor() {
        assert_eq!(NAME, "arbor");
    }
}
