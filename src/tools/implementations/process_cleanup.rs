use anyhow::Result;
use async_trait::async_trait;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use crate::pipeline::ExitCode;
use crate::tools::trait_def::{BuildTool, ToolContext};
use crate::variables::names;

/// Kills stray processes left behind by the build, such as compiler servers.
/// Registered as `run_always`, so it also runs after failures.
pub struct ProcessCleanupTool;

fn parse_targets(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive match that ignores a trailing `.exe`
fn matches_target(process_name: &str, targets: &[String]) -> bool {
    let strip = |name: &str| -> String {
        let lower = name.to_ascii_lowercase();
        lower
            .strip_suffix(".exe")
            .map(str::to_string)
            .unwrap_or(lower)
    };
    let process_name = strip(process_name);
    targets.iter().any(|target| strip(target) == process_name)
}

#[async_trait]
impl BuildTool for ProcessCleanupTool {
    fn name(&self) -> &'static str {
        "process_cleanup"
    }

    async fn execute(&self, context: &ToolContext<'_>) -> Result<ExitCode> {
        if !context
            .variables
            .bool_or(names::KILL_PROCESSES_ENABLED, false)?
        {
            return Ok(ExitCode::SUCCESS);
        }

        let targets = parse_targets(context.variables.value(names::KILL_PROCESSES)?.unwrap_or(""));
        if targets.is_empty() {
            debug!("No processes configured for cleanup");
            return Ok(ExitCode::SUCCESS);
        }

        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );
        let current = sysinfo::get_current_pid().ok();

        let mut killed = 0usize;
        for (pid, process) in system.processes() {
            if Some(*pid) == current {
                continue;
            }
            let name = process.name().to_string_lossy();
            if !matches_target(&name, &targets) {
                continue;
            }

            if process.kill() {
                info!(pid = pid.as_u32(), process = %name, "Killed process");
                killed += 1;
            } else {
                warn!(pid = pid.as_u32(), process = %name, "Failed to kill process");
            }
        }

        debug!(killed, "Process cleanup complete");
        Ok(ExitCode::SUCCESS)
    }
}
