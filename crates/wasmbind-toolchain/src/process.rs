//! Child process execution with captured output and an optional deadline.
//!
//! The adapter is synchronous at its boundary: each run drives the child on
//! a current-thread Tokio runtime and blocks until it exits or times out.

use std::io;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::time::Duration;

/// Output of a finished child process.
#[derive(Debug)]
pub(crate) struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    /// Stderr when non-empty, otherwise stdout.
    pub fn diagnostic_text(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

impl From<Output> for Captured {
    fn from(output: Output) -> Self {
        Self {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum RunError {
    Spawn(io::Error),
    Wait(io::Error),
    TimedOut(Duration),
}

/// Runs `command` to completion, capturing stdout and stderr.
///
/// With a `deadline`, the child is killed once it has run for that long.
pub(crate) fn run(command: Command, deadline: Option<Duration>) -> Result<Captured, RunError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(RunError::Spawn)?;
    runtime.block_on(capture(command, deadline))
}

async fn capture(command: Command, deadline: Option<Duration>) -> Result<Captured, RunError> {
    let mut command = tokio::process::Command::from(command);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let child = command.spawn().map_err(RunError::Spawn)?;

    let Some(limit) = deadline else {
        return child
            .wait_with_output()
            .await
            .map(Captured::from)
            .map_err(RunError::Wait);
    };

    // Dropping the pending wait drops the child, which kills it
    match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(output) => output.map(Captured::from).map_err(RunError::Wait),
        Err(_) => {
            tracing::warn!("Process exceeded {}s, killed", limit.as_secs_f64());
            Err(RunError::TimedOut(limit))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_captures_both_streams() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out; echo err >&2; exit 3"]);
        let captured = run(command, None).unwrap();
        assert_eq!(captured.status.code(), Some(3));
        assert_eq!(captured.stdout.trim(), "out");
        assert_eq!(captured.stderr.trim(), "err");
        assert_eq!(captured.diagnostic_text(), "err");
    }

    #[test]
    fn test_output_within_deadline_is_captured() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo done"]);
        let captured = run(command, Some(Duration::from_secs(30))).unwrap();
        assert!(captured.status.success());
        assert_eq!(captured.diagnostic_text(), "done");
    }

    #[test]
    fn test_deadline_kills_child() {
        let mut command = Command::new("sh");
        command.args(["-c", "exec sleep 10"]);
        let started = Instant::now();
        let err = run(command, Some(Duration::from_millis(200))).unwrap_err();
        assert!(matches!(err, RunError::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let command = Command::new("/nonexistent/wasmbind-test-compiler");
        assert!(matches!(run(command, None), Err(RunError::Spawn(_))));
    }
}
