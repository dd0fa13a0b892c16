// SPDX-License-Identifier: MIT OR Apache-2.0
//! Spawn one tool invocation and drive it to completion, timeout, or
//! cancellation.

use crate::cancel::CancelToken;
use crate::kill::{base_command, kill_group, terminate_group};
use crate::output::{drain_capped, Captured};
use neosec_error::{ErrorCode, NeoSecError};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::warn;

/// Default cap on retained stdout/stderr bytes per stream (64 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024 * 1024;

/// Default grace period between `SIGTERM` and `SIGKILL`.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// How an [`ExecutionOutcome`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process ran to completion on its own.
    Exited,
    /// The process exceeded its configured timeout and was killed.
    TimedOut,
    /// The process was killed in response to an external cancellation.
    Cancelled,
}

/// Inputs to one subprocess invocation.
pub struct ExecOptions {
    /// Working directory for the child. `None` inherits the caller's.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables, merged over the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Wall-clock budget for this single invocation, if any.
    pub timeout: Option<Duration>,
    /// Cap on retained bytes per stream; excess is drained and discarded.
    pub max_output_bytes: usize,
    /// Delay between `SIGTERM` and `SIGKILL` when terminating.
    pub grace_period: Duration,
    /// Signalled to cancel the run before its timeout elapses.
    pub cancel: CancelToken,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            working_dir: None,
            env: BTreeMap::new(),
            timeout: None,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            grace_period: DEFAULT_GRACE_PERIOD,
            cancel: CancelToken::new(),
        }
    }
}

/// Result of running one tool invocation to a terminal state.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// How the process ended.
    pub termination: Termination,
    /// Process exit code, when it exited on its own.
    pub exit_code: Option<i32>,
    /// Captured stdout.
    pub stdout: Captured,
    /// Captured stderr.
    pub stderr: Captured,
    /// Wall-clock time spent running.
    pub duration: Duration,
}

/// Spawn `argv[0]` with `argv[1..]` as arguments and drive it to a terminal
/// outcome, subject to `opts`.
///
/// Runs in its own process group (`4.3`) so timeout/cancellation can kill
/// the whole process tree, not just the direct child. `SpawnFailed` is the
/// only error this returns; timeout and cancellation are reported as
/// [`ExecutionOutcome`] values, not errors, since they are expected
/// per-task terminal states.
pub async fn run(argv: &[String], opts: ExecOptions) -> Result<ExecutionOutcome, NeoSecError> {
    let Some(binary) = argv.first() else {
        return Err(NeoSecError::new(ErrorCode::Internal, "empty command vector"));
    };

    let mut cmd = base_command(binary);
    cmd.args(&argv[1..]);
    if let Some(dir) = &opts.working_dir {
        cmd.current_dir(dir);
    }
    cmd.envs(opts.env.iter());

    let started = Instant::now();
    let mut child = cmd.spawn().map_err(|e| {
        NeoSecError::new(ErrorCode::SpawnFailed, format!("failed to spawn `{binary}`"))
            .with_context("binary", binary.as_str())
            .with_source(e)
    })?;

    let pgid = child.id().map(|pid| pid as i32);
    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");
    let max_bytes = opts.max_output_bytes;
    let stdout_task = tokio::spawn(async move { drain_capped(stdout, max_bytes).await });
    let stderr_task = tokio::spawn(async move { drain_capped(stderr, max_bytes).await });

    let termination = tokio::select! {
        status = child.wait() => {
            match status {
                Ok(status) => {
                    return Ok(ExecutionOutcome {
                        termination: Termination::Exited,
                        exit_code: status.code(),
                        stdout: stdout_task.await.unwrap_or_default(),
                        stderr: stderr_task.await.unwrap_or_default(),
                        duration: started.elapsed(),
                    });
                }
                Err(e) => {
                    warn!(target: "neosec.executor", error = %e, "wait() failed");
                    return Err(NeoSecError::new(ErrorCode::Internal, "failed to wait on child process")
                        .with_context("binary", binary.as_str())
                        .with_source(e));
                }
            }
        }
        _ = sleep_or_pending(opts.timeout) => Termination::TimedOut,
        _ = opts.cancel.cancelled() => Termination::Cancelled,
    };

    if let Some(pgid) = pgid {
        terminate_group(pgid);
    }
    let exited_gracefully = tokio::time::timeout(opts.grace_period, child.wait()).await;
    if exited_gracefully.is_err() {
        if let Some(pgid) = pgid {
            kill_group(pgid);
        }
    }
    let status = child.wait().await.ok();

    Ok(ExecutionOutcome {
        termination,
        exit_code: status.and_then(|s| s.code()),
        stdout: stdout_task.await.unwrap_or_default(),
        stderr: stderr_task.await.unwrap_or_default(),
        duration: started.elapsed(),
    })
}

async fn sleep_or_pending(timeout: Option<Duration>) {
    match timeout {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}
