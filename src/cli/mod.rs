pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, OutputFormatArg, ToolsArgs, VariablesArgs};
pub use output::{OutputFormat, OutputFormatter};
