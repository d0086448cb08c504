use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::pipeline::ExitCode;
use crate::tools::trait_def::{BuildTool, ToolContext};
use crate::variables::names::DESCRIPTIONS;

const HELP_ARGS: &[&str] = &["-h", "--help", "-?", "help"];

/// Prints usage when asked for help and stops the run before any real work
pub struct HelpTool;

pub fn is_help_request(args: &[String]) -> bool {
    args.iter()
        .any(|arg| HELP_ARGS.iter().any(|help| help.eq_ignore_ascii_case(arg)))
}

#[async_trait]
impl BuildTool for HelpTool {
    fn name(&self) -> &'static str {
        "help"
    }

    async fn execute(&self, context: &ToolContext<'_>) -> Result<ExitCode> {
        if !is_help_request(context.args) {
            return Ok(ExitCode::SUCCESS);
        }

        info!("Usage: arbor build [PATH] [--var KEY=VALUE]... [-- TOOL_ARGS...]");
        info!("Variables can be set on the command line, in the environment or in arbor.toml:");
        for (key, description) in DESCRIPTIONS {
            info!("  {:<50} {}", key, description);
        }

        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        short = { &["-h"], true },
        long = { &["--verbose", "--help"], true },
        question = { &["-?"], true },
        word = { &["HELP"], true },
        none = { &[], false },
        other = { &["--release"], false },
    )]
    fn test_is_help_request(args: &[&str], expected: bool) {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        assert_eq!(is_help_request(&args), expected);
    }
}
