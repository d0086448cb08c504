use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::pipeline::{BuildContext, ExitCode};
use crate::variables::VariableSet;

/// What a tool sees while it runs. Everything is read-only: the variable set
/// is final once tools start.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub variables: &'a VariableSet,
    /// Extra command line arguments passed to the run
    pub args: &'a [String],
    pub build: &'a BuildContext,
    pub cancel: &'a CancellationToken,
}

/// One step of the build.
///
/// A non-success [`ExitCode`] is an ordinary failure: later tools are skipped
/// but `run_always` tools still run. Returning an error aborts the run; a
/// [`VariableError`](crate::variables::VariableError) in the chain is reported
/// as a configuration error.
#[async_trait]
pub trait BuildTool: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, context: &ToolContext<'_>) -> Result<ExitCode>;
}
