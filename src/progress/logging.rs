//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { source } => {
                info!(source = %source, "Starting build");
            }
            ProgressEvent::ProviderStarted { provider, order } => {
                debug!(provider = %provider, order, "Running variable provider");
            }
            ProgressEvent::ProviderComplete {
                provider,
                variables,
                duration,
            } => {
                debug!(
                    provider = %provider,
                    variables,
                    duration_ms = duration.as_millis(),
                    "Variable provider complete"
                );
            }
            ProgressEvent::VariablesResolved { total, aliases } => {
                info!(variables = total, aliases, "Variables resolved");
            }
            ProgressEvent::ToolStarted {
                tool,
                priority,
                run_always,
            } => {
                info!(tool = %tool, priority, run_always, "Running tool");
            }
            ProgressEvent::ToolComplete {
                tool,
                exit_code,
                duration,
            } => {
                if *exit_code == 0 {
                    info!(
                        tool = %tool,
                        exit_code,
                        duration_ms = duration.as_millis(),
                        "Tool complete"
                    );
                } else {
                    warn!(
                        tool = %tool,
                        exit_code,
                        duration_ms = duration.as_millis(),
                        "Tool failed"
                    );
                }
            }
            ProgressEvent::ToolSkipped { tool, reason } => {
                info!(tool = %tool, reason = %reason, "Tool skipped");
            }
            ProgressEvent::Completed {
                exit_code,
                total_time,
            } => {
                if *exit_code == 0 {
                    info!(
                        exit_code,
                        total_time_ms = total_time.as_millis(),
                        "Build succeeded"
                    );
                } else {
                    warn!(
                        exit_code,
                        total_time_ms = total_time.as_millis(),
                        "Build failed"
                    );
                }
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Build aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_logging_all_events() {
        let handler = LoggingHandler;

        let events = vec![
            ProgressEvent::Started {
                source: "/repo".to_string(),
            },
            ProgressEvent::ProviderStarted {
                provider: "version".to_string(),
                order: 4,
            },
            ProgressEvent::ProviderComplete {
                provider: "version".to_string(),
                variables: 5,
                duration: Duration::from_millis(3),
            },
            ProgressEvent::VariablesResolved {
                total: 20,
                aliases: 60,
            },
            ProgressEvent::ToolStarted {
                tool: "compile".to_string(),
                priority: 100,
                run_always: false,
            },
            ProgressEvent::ToolComplete {
                tool: "compile".to_string(),
                exit_code: 0,
                duration: Duration::from_millis(10),
            },
            ProgressEvent::ToolComplete {
                tool: "test".to_string(),
                exit_code: 1,
                duration: Duration::from_millis(10),
            },
            ProgressEvent::ToolSkipped {
                tool: "package".to_string(),
                reason: "earlier tool failed".to_string(),
            },
            ProgressEvent::Completed {
                exit_code: 1,
                total_time: Duration::from_secs(5),
            },
            ProgressEvent::Failed {
                error: "Test error".to_string(),
            },
        ];

        for event in events {
            handler.on_progress(&event);
        }
    }
}
