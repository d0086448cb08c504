//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a build runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started { source: String },

    /// Variable provider started
    ProviderStarted { provider: String, order: i32 },

    /// Variable provider returned
    ProviderComplete {
        provider: String,
        variables: usize,
        duration: Duration,
    },

    /// Resolution and aliasing finished
    VariablesResolved { total: usize, aliases: usize },

    /// Tool started
    ToolStarted {
        tool: String,
        priority: i32,
        run_always: bool,
    },

    /// Tool returned an exit code
    ToolComplete {
        tool: String,
        exit_code: i32,
        duration: Duration,
    },

    /// Tool skipped after a failure or cancellation
    ToolSkipped { tool: String, reason: String },

    /// All tools processed
    Completed { exit_code: i32, total_time: Duration },

    /// Run aborted with a fatal error
    Failed { error: String },
}

/// Receives progress events during a run
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
