//! Launches one external solver on one instance file and times it.
//!
//! Wall-clock time runs from just before the process is spawned until it
//! exits, so it includes the solver's own file I/O. A non-zero exit or a
//! failed launch is reported as an outcome, never as an error.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;
use shared::{AppError, AppResult};
use tokio::process::Command;
use tokio::time;
use tracing::warn;

/// Destination for a solver's standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    Discard,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationOutcome {
    Success,
    /// `code` is `None` when the process was terminated by a signal.
    NonZeroExit { code: Option<i32> },
    TimedOut,
    LaunchFailed { reason: String },
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success)
    }
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub elapsed: Duration,
    pub outcome: InvocationOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct SolverInvoker {
    timeout: Option<Duration>,
}

impl SolverInvoker {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run `program [args..] <instance>` to completion, or until the timeout
    /// elapses, in which case the child is killed.
    pub async fn invoke(
        &self,
        program: &Path,
        args: &[String],
        instance: &Path,
        sink: &OutputSink,
    ) -> AppResult<Invocation> {
        let stdout = match sink {
            OutputSink::Discard => Stdio::null(),
            OutputSink::File(path) => {
                let file = File::create(path).map_err(|err| {
                    AppError::io(format!("failed to create result file {path:?}"), err)
                })?;
                Stdio::from(file)
            }
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .arg(instance)
            .stdin(Stdio::null())
            .stdout(stdout)
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                return Ok(Invocation {
                    elapsed: start.elapsed(),
                    outcome: InvocationOutcome::LaunchFailed {
                        reason: format!("failed to launch {program:?}: {err}"),
                    },
                });
            }
        };

        let waited = match self.timeout {
            Some(limit) => time::timeout(limit, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };
        let elapsed = start.elapsed();

        let outcome = match waited {
            Some(Ok(status)) if status.success() => InvocationOutcome::Success,
            Some(Ok(status)) => InvocationOutcome::NonZeroExit {
                code: status.code(),
            },
            Some(Err(err)) => InvocationOutcome::LaunchFailed {
                reason: format!("failed to wait for {program:?}: {err}"),
            },
            None => {
                if let Err(err) = child.kill().await {
                    warn!(program = ?program, error = %err, "failed to kill timed-out solver");
                }
                InvocationOutcome::TimedOut
            }
        };

        Ok(Invocation { elapsed, outcome })
    }
}
