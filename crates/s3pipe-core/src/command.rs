//! Shell command execution with captured standard output.

use std::process::Stdio;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::process::Command;

use crate::error::{ExportError, ExportResult};

/// Tracing target for command execution.
pub const TRACING_TARGET: &str = "s3pipe_core::command";

/// How a nonzero exit status of the export command is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Log a warning and export whatever was captured.
    #[default]
    Ignore,
    /// Abort the run before anything is uploaded.
    Fail,
}

/// Result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Everything the command wrote to standard output.
    pub stdout: Bytes,
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Wall-clock time from spawn to exit.
    pub elapsed: Duration,
}

impl CommandOutput {
    /// Returns `true` if the command exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Applies `policy` to the exit status.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Execution`] when the command failed and the
    /// policy is [`ExitPolicy::Fail`].
    pub fn check(&self, policy: ExitPolicy) -> ExportResult<()> {
        if self.success() {
            return Ok(());
        }

        let status = match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "a signal".to_owned(),
        };

        match policy {
            ExitPolicy::Ignore => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    exit_code = ?self.exit_code,
                    captured_bytes = self.stdout.len(),
                    "Command terminated with {status}, exporting captured output anyway"
                );
                Ok(())
            }
            ExitPolicy::Fail => Err(ExportError::execution(format!(
                "command terminated with {status}"
            ))),
        }
    }
}

/// Runs a command line through a POSIX shell.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    shell: String,
}

impl CommandRunner {
    /// Creates a runner that invokes `<shell> -c <command>`.
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Returns the shell program.
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Runs `command` to completion and captures its standard output.
    ///
    /// Standard error is inherited, standard input is closed. A nonzero
    /// exit status is reported in the output, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Execution`] if the shell cannot be spawned.
    pub async fn run(&self, command: &str) -> ExportResult<CommandOutput> {
        tracing::debug!(
            target: TRACING_TARGET,
            shell = %self.shell,
            "Spawning command"
        );

        let started = Instant::now();
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| ExportError::spawn(&self.shell, e))?;
        let elapsed = started.elapsed();

        let exit_code = output.status.code();

        tracing::debug!(
            target: TRACING_TARGET,
            exit_code = ?exit_code,
            captured_bytes = output.stdout.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Command finished"
        );

        Ok(CommandOutput {
            stdout: Bytes::from(output.stdout),
            exit_code,
            elapsed,
        })
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new("sh")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_bytes_exactly() {
        let output = CommandRunner::default()
            .run("printf 'hello'")
            .await
            .unwrap();

        assert_eq!(output.stdout.as_ref(), b"hello");
        assert_eq!(output.exit_code, Some(0));
        assert!(output.success());
    }

    #[tokio::test]
    async fn stderr_is_not_captured() {
        let output = CommandRunner::default()
            .run("printf out; printf err >&2")
            .await
            .unwrap();

        assert_eq!(output.stdout.as_ref(), b"out");
    }

    #[tokio::test]
    async fn binary_output_survives() {
        let output = CommandRunner::default()
            .run(r"printf '\000\377\001'")
            .await
            .unwrap();

        assert_eq!(output.stdout.as_ref(), &[0x00, 0xff, 0x01]);
    }

    #[tokio::test]
    async fn nonzero_exit_still_returns_output() {
        let output = CommandRunner::default()
            .run("printf partial; exit 3")
            .await
            .unwrap();

        assert_eq!(output.stdout.as_ref(), b"partial");
        assert_eq!(output.exit_code, Some(3));
        assert!(output.check(ExitPolicy::Ignore).is_ok());

        let err = output.check(ExitPolicy::Fail).unwrap_err();
        assert!(matches!(err, ExportError::Execution { .. }));
        assert!(err.to_string().contains("exit code 3"));
    }

    #[tokio::test]
    async fn missing_shell_is_execution_error() {
        let err = CommandRunner::new("/nonexistent/shell")
            .run("true")
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Execution { source: Some(_), .. }));
    }
}
