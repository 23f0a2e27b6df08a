//! Shell execution for verb and measurement commands.

use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

const RUNNER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runner");

/// Executes configured command lines on behalf of the dispatcher.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Runs `command_line` to completion and returns its trimmed stdout.
    fn run(&self, command_line: &str) -> Result<String, CommandError>;
}

impl<T> CommandRunner for Arc<T>
where
    T: CommandRunner + ?Sized,
{
    fn run(&self, command_line: &str) -> Result<String, CommandError> {
        (**self).run(command_line)
    }
}

/// Errors raised while executing a command line.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The shell could not be started.
    #[error("failed to start '{shell}' for `{command}`: {source}")]
    Spawn {
        /// Shell interpreter that failed to start.
        shell: String,
        /// Command line that was being executed.
        command: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The command ran but did not succeed.
    #[error("`{command}` failed with {status}")]
    Status {
        /// Command line that failed.
        command: String,
        /// Exit status reported by the shell.
        status: ExitStatus,
    },
}

/// Runs command lines through `<shell> -c`.
///
/// Only stdout is captured. Stderr is inherited so command diagnostics land in
/// the daemon's own output, and stdin is closed.
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    shell: String,
}

impl ShellCommandRunner {
    /// Builds a runner for the given shell interpreter.
    #[must_use]
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl CommandRunner for ShellCommandRunner {
    fn run(&self, command_line: &str) -> Result<String, CommandError> {
        debug!(
            target: RUNNER_TARGET,
            shell = %self.shell,
            command = command_line,
            "running command"
        );
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| CommandError::Spawn {
                shell: self.shell.clone(),
                command: command_line.to_owned(),
                source,
            })?;
        if !output.status.success() {
            return Err(CommandError::Status {
                command: command_line.to_owned(),
                status: output.status,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}
