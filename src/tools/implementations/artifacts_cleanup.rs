use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::pipeline::ExitCode;
use crate::tools::trait_def::{BuildTool, ToolContext};
use crate::variables::names;

/// Deletes the artifacts directory before building, retrying while files are
/// still held open
pub struct ArtifactsCleanupTool {
    attempts: u32,
    delay: Duration,
}

impl ArtifactsCleanupTool {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl Default for ArtifactsCleanupTool {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(200))
    }
}

#[async_trait]
impl BuildTool for ArtifactsCleanupTool {
    fn name(&self) -> &'static str {
        "artifacts_cleanup"
    }

    async fn execute(&self, context: &ToolContext<'_>) -> Result<ExitCode> {
        if !context
            .variables
            .bool_or(names::ARTIFACTS_CLEANUP_ENABLED, false)?
        {
            debug!("Artifacts cleanup disabled");
            return Ok(ExitCode::SUCCESS);
        }

        let artifacts = context.variables.require_path(names::ARTIFACTS)?;
        let fs = &context.build.file_system;
        if !fs.exists(&artifacts) {
            debug!(path = %artifacts.display(), "Artifacts directory does not exist");
            return Ok(ExitCode::SUCCESS);
        }

        for attempt in 1..=self.attempts {
            match fs.remove_dir_all(&artifacts) {
                Ok(()) => {
                    info!(path = %artifacts.display(), attempt, "Removed artifacts directory");
                    return Ok(ExitCode::SUCCESS);
                }
                Err(e) if attempt < self.attempts => {
                    warn!(path = %artifacts.display(), attempt, error = %e, "Could not remove artifacts directory, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(self.delay) => {}
                        _ = context.cancel.cancelled() => return Ok(ExitCode::CANCELLED),
                    }
                }
                Err(e) => {
                    error!(path = %artifacts.display(), attempts = self.attempts, error = %e, "Failed to remove artifacts directory");
                }
            }
        }

        Ok(ExitCode::FAILURE)
    }
}
