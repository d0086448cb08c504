//! Child process execution
//!
//! Commands run through `tokio::process` with their output streamed into the
//! log line by line. A run ends when the child exits, the cancellation token
//! fires, or the optional timeout elapses; in the last two cases the child is
//! killed before returning.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Exited(i32),
    /// Terminated by a signal, no exit code available
    Signalled,
    Cancelled,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub outcome: ProcessOutcome,
    pub stdout: String,
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env: Vec::new(),
            timeout: None,
        }
    }

    /// Run a command line through the platform shell
    pub fn shell(command_line: &str) -> Self {
        if cfg!(windows) {
            Self::new("cmd").arg("/C").arg(command_line)
        } else {
            Self::new("sh").arg("-c").arg(command_line)
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs child processes, logging their output unless quiet
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    quiet: bool,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture stdout without echoing output to the log
    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutput, ProcessError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in &spec.env {
            command.env(key, value);
        }

        debug!(command = %spec, "Starting process");
        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let stdout = child
            .stdout
            .take()
            .map(|pipe| forward_lines(pipe, self.quiet, false));
        let stderr = child
            .stderr
            .take()
            .map(|pipe| forward_lines(pipe, self.quiet, true));

        let deadline = async {
            match spec.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        let finished = tokio::select! {
            status = child.wait() => Finished::Exited(status),
            _ = cancel.cancelled() => Finished::Cancelled,
            _ = deadline => Finished::TimedOut,
        };

        let outcome = match finished {
            Finished::Exited(Ok(status)) => match status.code() {
                Some(code) => ProcessOutcome::Exited(code),
                None => ProcessOutcome::Signalled,
            },
            Finished::Exited(Err(source)) => {
                return Err(ProcessError::Wait {
                    program: spec.program.clone(),
                    source,
                })
            }
            Finished::Cancelled => {
                info!(command = %spec, "Cancelling process");
                kill(&mut child, spec).await;
                ProcessOutcome::Cancelled
            }
            Finished::TimedOut => {
                warn!(
                    command = %spec,
                    timeout_secs = spec.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                    "Process timed out"
                );
                kill(&mut child, spec).await;
                ProcessOutcome::TimedOut
            }
        };

        // Grandchildren of a killed process may still hold the pipes open
        let stdout = match (outcome, stdout) {
            (ProcessOutcome::Exited(_) | ProcessOutcome::Signalled, Some(handle)) => {
                handle.await.unwrap_or_default()
            }
            (_, Some(handle)) => {
                handle.abort();
                String::new()
            }
            (_, None) => String::new(),
        };
        if let Some(handle) = stderr {
            if matches!(outcome, ProcessOutcome::Exited(_) | ProcessOutcome::Signalled) {
                let _ = handle.await;
            } else {
                handle.abort();
            }
        }

        debug!(command = %spec, outcome = ?outcome, "Process finished");
        Ok(ProcessOutput { outcome, stdout })
    }
}

enum Finished {
    Exited(std::io::Result<std::process::ExitStatus>),
    Cancelled,
    TimedOut,
}

async fn kill(child: &mut tokio::process::Child, spec: &CommandSpec) {
    if let Err(e) = child.kill().await {
        warn!(command = %spec, error = %e, "Failed to kill process");
    }
}

fn forward_lines<R>(pipe: R, quiet: bool, is_stderr: bool) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut captured = String::new();
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if !quiet {
                if is_stderr {
                    warn!(target: "arbor::process", "{}", line);
                } else {
                    info!(target: "arbor::process", "{}", line);
                }
            }
            if !is_stderr {
                captured.push_str(&line);
                captured.push('\n');
            }
        }
        captured
    })
}
