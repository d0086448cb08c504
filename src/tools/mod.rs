//! Build tools and their execution

pub mod executor;
pub mod implementations;
pub mod registry;
pub mod trait_def;

pub use executor::{ExecutionReport, ExecutionState, SkipReason, ToolExecutor, ToolOutcome, ToolRecord};
pub use registry::{ToolPriority, ToolRegistration, ToolRegistry};
pub use trait_def::{BuildTool, ToolContext};
