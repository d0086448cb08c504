//! Translating a run's result into the process exit status

use tracing::error;

use crate::error::BuildError;
use crate::pipeline::ExitCode;

/// Process exit status for a finished run
pub fn process_exit_status(result: &Result<ExitCode, BuildError>) -> i32 {
    match result {
        Ok(exit_code) => exit_code.code(),
        Err(BuildError::Cancelled { .. }) => ExitCode::CANCELLED.code(),
        Err(_) => ExitCode::FAILURE.code(),
    }
}

/// Log a fatal error together with its redacted variable snapshot. Ordinary
/// tool failures are logged by the tools themselves and not repeated here.
pub fn report_outcome(result: &Result<ExitCode, BuildError>) {
    let Err(build_error) = result else {
        return;
    };

    error!("{}", build_error);
    if matches!(build_error, BuildError::Cancelled { .. }) {
        return;
    }

    let snapshot = build_error.snapshot();
    error!(count = snapshot.len(), "Variables at the time of failure:");
    for line in snapshot.lines() {
        error!("  {}", line);
    }
}
