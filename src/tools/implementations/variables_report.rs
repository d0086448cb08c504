use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::diagnostics::VariableSnapshot;
use crate::pipeline::ExitCode;
use crate::tools::trait_def::{BuildTool, ToolContext};
use crate::variables::names;

/// Logs every resolved variable, redacted, when `Arbor.Build.Log.Variables`
/// is set
pub struct VariablesReportTool;

#[async_trait]
impl BuildTool for VariablesReportTool {
    fn name(&self) -> &'static str {
        "variables_report"
    }

    async fn execute(&self, context: &ToolContext<'_>) -> Result<ExitCode> {
        if !context.variables.bool_or(names::LOG_VARIABLES, false)? {
            return Ok(ExitCode::SUCCESS);
        }

        let snapshot = VariableSnapshot::capture(context.variables, context.build.secrets());
        info!(count = snapshot.len(), "Resolved variables");
        for line in snapshot.lines() {
            info!("  {}", line);
        }

        Ok(ExitCode::SUCCESS)
    }
}
