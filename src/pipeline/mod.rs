//! Build pipeline: per-run context, configuration and orchestration

pub mod config;
pub mod context;
pub mod exit_code;
pub mod orchestrator;

pub use config::{DuplicateKeyPolicy, PipelineConfig};
pub use context::BuildContext;
pub use exit_code::ExitCode;
pub use orchestrator::BuildPipeline;
