//! Tool execution
//!
//! Runs the ordered tools against the final variable set. The first failing
//! tool moves the run into [`ExecutionState::FailedDraining`]: from then on
//! only `run_always` tools execute, in their original positions. Cancellation
//! has the same effect, recording [`ExitCode::CANCELLED`] when nothing failed
//! before it.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::BuildError;
use crate::pipeline::ExitCode;
use crate::progress::{ProgressEvent, ProgressHandler};

use super::registry::ToolRegistration;
use super::trait_def::ToolContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    FailedDraining,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EarlierFailure,
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EarlierFailure => f.write_str("an earlier tool failed"),
            SkipReason::Cancelled => f.write_str("the build was cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Completed(ExitCode),
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
pub struct ToolRecord {
    pub name: &'static str,
    pub priority: i32,
    pub run_always: bool,
    pub outcome: ToolOutcome,
    pub duration: Duration,
}

/// What happened to every tool of a finished run
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub exit_code: ExitCode,
    pub records: Vec<ToolRecord>,
}

impl ExecutionReport {
    /// Names of the tools that ran, in execution order
    pub fn executed(&self) -> Vec<&'static str> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, ToolOutcome::Completed(_)))
            .map(|r| r.name)
            .collect()
    }

    pub fn skipped(&self) -> Vec<&'static str> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, ToolOutcome::Skipped(_)))
            .map(|r| r.name)
            .collect()
    }

    pub fn outcome_of(&self, name: &str) -> Option<ToolOutcome> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.outcome)
    }
}

/// Drives tools through the execution state machine
#[derive(Default)]
pub struct ToolExecutor {
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = Some(handler);
        self
    }

    /// Execute `tools`, which must already be in priority order.
    ///
    /// An error escaping a tool aborts the run at once, without running any
    /// further tool, and carries the redacted variable snapshot.
    pub async fn execute(
        &self,
        tools: &[ToolRegistration],
        context: &ToolContext<'_>,
    ) -> Result<ExecutionReport, BuildError> {
        let mut state = ExecutionState::Running;
        let mut failure: Option<ExitCode> = None;
        let mut records = Vec::with_capacity(tools.len());

        for registration in tools {
            let name = registration.name();

            if context.cancel.is_cancelled() && state == ExecutionState::Running {
                info!(tool = name, "Build cancelled, skipping remaining tools");
                failure.get_or_insert(ExitCode::CANCELLED);
                state = ExecutionState::FailedDraining;
            }

            if state == ExecutionState::FailedDraining && !registration.run_always {
                let reason = if context.cancel.is_cancelled() {
                    SkipReason::Cancelled
                } else {
                    SkipReason::EarlierFailure
                };
                self.emit(&ProgressEvent::ToolSkipped {
                    tool: name.to_string(),
                    reason: reason.to_string(),
                });
                records.push(ToolRecord {
                    name,
                    priority: registration.priority,
                    run_always: registration.run_always,
                    outcome: ToolOutcome::Skipped(reason),
                    duration: Duration::ZERO,
                });
                continue;
            }

            self.emit(&ProgressEvent::ToolStarted {
                tool: name.to_string(),
                priority: registration.priority,
                run_always: registration.run_always,
            });
            let start = Instant::now();

            let exit_code = match registration.tool.execute(context).await {
                Ok(exit_code) => exit_code,
                Err(error) => {
                    return Err(BuildError::from_tool(
                        name,
                        error,
                        context.variables,
                        context.build.secrets(),
                    ));
                }
            };
            let duration = start.elapsed();

            self.emit(&ProgressEvent::ToolComplete {
                tool: name.to_string(),
                exit_code: exit_code.code(),
                duration,
            });
            records.push(ToolRecord {
                name,
                priority: registration.priority,
                run_always: registration.run_always,
                outcome: ToolOutcome::Completed(exit_code),
                duration,
            });

            if !exit_code.is_success() {
                if failure.is_none() {
                    warn!(tool = name, exit_code = exit_code.code(), "Recording first failure");
                    failure = Some(exit_code);
                } else {
                    debug!(tool = name, exit_code = exit_code.code(), "Failure already recorded");
                }
                state = ExecutionState::FailedDraining;
            }
        }

        state = ExecutionState::Done;
        debug!(state = ?state, tools = records.len(), "Tool execution finished");

        Ok(ExecutionReport {
            exit_code: failure.unwrap_or(ExitCode::SUCCESS),
            records,
        })
    }

    fn emit(&self, event: &ProgressEvent) {
        if let Some(handler) = &self.progress {
            handler.on_progress(event);
        }
    }
}
