// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with enforced timeouts and guaranteed cleanup.
//!
//! Each spawn places the child in its own process group, drains stdout and
//! stderr with two concurrent tasks (so a full pipe can never deadlock the
//! child), and races `wait()` against the timeout. On expiry the whole
//! group gets SIGTERM, a bounded grace period, then SIGKILL; the child is
//! always reaped, and any output produced before the kill is preserved on
//! the error.
//!
//! Timeout state machine:
//!
//! ```text
//!   spawned ──normal exit──▶ completed
//!      │
//!      └── timer fires ──▶ terminating ──grace expires──▶ killed ──▶ reaped
//!                               │
//!                               └── exits in grace ──────────────▶ reaped
//! ```

use crate::env;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Specification for one spawn. Owned by a single call to [`spawn`].
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    /// Program and arguments. Never a joined shell string.
    pub argv: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
    /// Raise on non-zero exit or signal death instead of returning a
    /// failed result.
    pub check: bool,
    /// Add prompt-suppressing environment for common tools.
    pub non_interactive: bool,
    /// Fail open: fold spawn/exit errors into a `success=false` result.
    pub advisory: bool,
    /// Data written to the child's stdin. The adapter never writes to
    /// stdin unless this is set; without it stdin is `/dev/null`.
    pub input: Option<String>,
    /// Also keep the raw bytes of both streams (binary-safe capture).
    pub capture_raw: bool,
}

impl SpawnSpec {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            working_dir: None,
            env: Vec::new(),
            timeout: env::default_step_timeout(),
            check: false,
            non_interactive: false,
            advisory: false,
            input: None,
            capture_raw: false,
        }
    }

    /// Convenience constructor for `sh -c <command>` spawns, used for
    /// rendered shell command strings.
    pub fn shell(command: impl Into<String>) -> Self {
        Self::new(vec![
            "sh".to_string(),
            "-c".to_string(),
            command.into(),
        ])
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn non_interactive(mut self, on: bool) -> Self {
        self.non_interactive = on;
        self
    }

    pub fn advisory(mut self, on: bool) -> Self {
        self.advisory = on;
        self
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn capture_raw(mut self, on: bool) -> Self {
        self.capture_raw = on;
        self
    }
}

/// Outcome of one spawn.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubprocessResult {
    /// UTF-8 stdout, invalid sequences replaced.
    pub stdout: String,
    pub stderr: String,
    /// Raw bytes, present when the spec opted into binary-safe capture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_raw: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr_raw: Option<Vec<u8>>,
    /// Exit code, absent on signal death.
    pub exit_code: Option<i32>,
    /// Raw OS wait status (Unix), for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_raw: Option<i32>,
    pub duration_secs: f64,
    pub timed_out: bool,
    /// Terminated by a signal that was not our timeout kill.
    pub crashed: bool,
    pub pid: u32,
    pub success: bool,
}

/// Errors from [`spawn`].
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to spawn {argv:?}: {source}")]
    SpawnFailed {
        argv: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "command {argv:?} timed out after {timeout_secs}s (ran {duration_secs:.1}s, pid {pid}, killed)"
    )]
    Timeout {
        argv: Vec<String>,
        timeout_secs: f64,
        duration_secs: f64,
        pid: u32,
        /// Output captured and flushed before the kill.
        stdout: String,
        stderr: String,
    },

    #[error("command {argv:?} exited with code {exit_code}")]
    NonZeroExit {
        argv: Vec<String>,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("command {argv:?} terminated by signal {signal:?}")]
    Crashed {
        argv: Vec<String>,
        signal: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("i/o error waiting on {argv:?}: {source}")]
    Io {
        argv: Vec<String>,
        #[source]
        source: std::io::Error,
    },
}

/// Spawn a process per `spec`.
///
/// Returns within `spec.timeout` plus the grace period. On advisory specs
/// every error is folded into a failed result instead of raised.
pub async fn spawn(spec: SpawnSpec) -> Result<SubprocessResult, SubprocessError> {
    let advisory = spec.advisory;
    match run(spec).await {
        Ok(result) => Ok(result),
        Err(e) if advisory => {
            tracing::warn!(error = %e, "advisory spawn failed");
            Ok(SubprocessResult::from_error(&e))
        }
        Err(e) => Err(e),
    }
}

async fn run(spec: SpawnSpec) -> Result<SubprocessResult, SubprocessError> {
    let argv = spec.argv.clone();
    let Some(program) = argv.first() else {
        return Err(SubprocessError::SpawnFailed {
            argv,
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
        });
    };

    let mut cmd = Command::new(program);
    cmd.args(&argv[1..]);
    if let Some(dir) = &spec.working_dir {
        cmd.current_dir(dir);
    }
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }
    if spec.non_interactive {
        for (key, value) in env::non_interactive_env() {
            cmd.env(key, value);
        }
    }
    cmd.stdin(if spec.input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    // Backstop: if this future is dropped mid-flight the child still dies.
    cmd.kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|source| SubprocessError::SpawnFailed {
        argv: argv.clone(),
        source,
    })?;
    let pid = child.id().unwrap_or(0);
    tracing::debug!(
        pid,
        argv = ?argv,
        timeout_secs = spec.timeout.as_secs_f64(),
        "subprocess started"
    );

    if let Some(input) = &spec.input {
        if let Some(mut stdin) = child.stdin.take() {
            use tokio::io::AsyncWriteExt;
            // Best effort: the child may exit before reading everything.
            let _ = stdin.write_all(input.as_bytes()).await;
        }
        // stdin dropped here, closing the pipe
    }

    // Both streams drain concurrently with wait(); a full pipe can never
    // block the child, and partial output survives a kill.
    let stdout_task = drain(child.stdout.take());
    let stderr_task = drain(child.stderr.take());

    let (status, timed_out) = match tokio::time::timeout(spec.timeout, child.wait()).await {
        Ok(Ok(status)) => (Some(status), false),
        Ok(Err(source)) => {
            terminate_group(&mut child, pid).await;
            return Err(SubprocessError::Io { argv, source });
        }
        Err(_elapsed) => {
            terminate_group(&mut child, pid).await;
            (None, true)
        }
    };

    let stdout_bytes = stdout_task.await.unwrap_or_default();
    let stderr_bytes = stderr_task.await.unwrap_or_default();
    let duration_secs = start.elapsed().as_secs_f64();
    let stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();
    let stderr = String::from_utf8_lossy(&stderr_bytes).into_owned();

    if timed_out {
        tracing::warn!(pid, argv = ?argv, duration_secs, "subprocess timed out; group killed");
        return Err(SubprocessError::Timeout {
            argv,
            timeout_secs: spec.timeout.as_secs_f64(),
            duration_secs,
            pid,
            stdout,
            stderr,
        });
    }

    // timed_out is false here, so wait() returned a status.
    let Some(status) = status else {
        return Err(SubprocessError::Io {
            argv,
            source: std::io::Error::other("missing exit status"),
        });
    };
    let exit_code = status.code();
    let crashed = exit_code.is_none();
    let success = status.success();
    tracing::debug!(pid, exit_code = ?exit_code, duration_secs, crashed, "subprocess completed");

    if spec.check && crashed {
        return Err(SubprocessError::Crashed {
            argv,
            signal: status_signal(&status),
            stdout,
            stderr,
        });
    }
    if spec.check && !success {
        return Err(SubprocessError::NonZeroExit {
            argv,
            exit_code: exit_code.unwrap_or(-1),
            stdout,
            stderr,
        });
    }

    Ok(SubprocessResult {
        stdout,
        stderr,
        stdout_raw: spec.capture_raw.then_some(stdout_bytes),
        stderr_raw: spec.capture_raw.then_some(stderr_bytes),
        exit_code,
        status_raw: status_raw(&status),
        duration_secs,
        timed_out: false,
        crashed,
        pid,
        success,
    })
}

/// Read a stream to completion in a background task.
fn drain<R>(stream: Option<R>) -> tokio::task::JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf).await;
        }
        buf
    })
}

/// SIGTERM the child's process group, wait out the grace period, then
/// SIGKILL and reap. Covers grandchildren that stayed in the group.
async fn terminate_group(child: &mut Child, pid: u32) {
    signal_group(pid, false);
    if tokio::time::timeout(env::grace_period(), child.wait())
        .await
        .is_ok()
    {
        return; // exited within grace; already reaped
    }
    signal_group(pid, true);
    let _ = child.start_kill();
    let _ = child.wait().await;
}

#[cfg(unix)]
fn signal_group(pid: u32, hard: bool) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if pid == 0 {
        return;
    }
    let signal = if hard { Signal::SIGKILL } else { Signal::SIGTERM };
    if let Err(e) = killpg(Pid::from_raw(pid as i32), signal) {
        tracing::debug!(pid, ?signal, error = %e, "killpg failed (group may be gone)");
    }
}

#[cfg(not(unix))]
fn signal_group(_pid: u32, _hard: bool) {
    // No process groups; kill_on_drop and start_kill cover the direct child.
}

#[cfg(unix)]
fn status_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn status_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

#[cfg(unix)]
fn status_raw(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    Some(status.into_raw())
}

#[cfg(not(unix))]
fn status_raw(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

impl SubprocessResult {
    /// Fold an error into a failed result, for advisory spawns.
    fn from_error(e: &SubprocessError) -> Self {
        let mut result = Self {
            stdout: String::new(),
            stderr: String::new(),
            stdout_raw: None,
            stderr_raw: None,
            exit_code: None,
            status_raw: None,
            duration_secs: 0.0,
            timed_out: false,
            crashed: false,
            pid: 0,
            success: false,
        };
        match e {
            SubprocessError::Timeout {
                stdout,
                stderr,
                pid,
                duration_secs,
                ..
            } => {
                result.stdout = stdout.clone();
                result.stderr = stderr.clone();
                result.pid = *pid;
                result.duration_secs = *duration_secs;
                result.timed_out = true;
            }
            SubprocessError::NonZeroExit {
                exit_code,
                stdout,
                stderr,
                ..
            } => {
                result.stdout = stdout.clone();
                result.stderr = stderr.clone();
                result.exit_code = Some(*exit_code);
            }
            SubprocessError::Crashed { stdout, stderr, .. } => {
                result.stdout = stdout.clone();
                result.stderr = stderr.clone();
                result.crashed = true;
            }
            SubprocessError::SpawnFailed { source, .. } => {
                result.stderr = source.to_string();
            }
            SubprocessError::Io { source, .. } => {
                result.stderr = source.to_string();
            }
        }
        result
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
