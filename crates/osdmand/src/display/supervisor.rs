use std::io::{self, PipeReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use super::{DISPLAY_TARGET, DisplayError};
use crate::lifecycle::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// How supervision of the display program ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayExit {
    /// The program exited on its own.
    Exited(ExitStatus),
    /// The daemon cancelled the program.
    Cancelled,
}

/// Launches the display program through a shell.
#[derive(Debug, Clone)]
pub struct DisplaySupervisor {
    shell: String,
    command: String,
}

impl DisplaySupervisor {
    /// Builds a supervisor that starts `command` through `shell`.
    #[must_use]
    pub fn new(shell: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            command: command.into(),
        }
    }

    /// Starts the program with `stdin` as its standard input.
    ///
    /// The program's stdout and stderr both go to the daemon's stdout.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Spawn`] when the program cannot be started.
    pub fn launch(&self, stdin: PipeReader) -> Result<RunningDisplay, DisplayError> {
        let child = self.spawn(stdin)?;
        info!(
            target: DISPLAY_TARGET,
            pid = child.id(),
            command = %self.command,
            "display program started"
        );
        Ok(RunningDisplay { child })
    }

    fn spawn(&self, stdin: PipeReader) -> Result<Child, DisplayError> {
        Command::new(&self.shell)
            .arg("-c")
            .arg(format!("exec {}", self.command))
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::inherit())
            .stderr(io::stdout())
            .spawn()
            .map_err(|source| DisplayError::Spawn {
                shell: self.shell.clone(),
                command: self.command.clone(),
                source,
            })
    }
}

/// A started display program awaiting supervision.
#[derive(Debug)]
pub struct RunningDisplay {
    child: Child,
}

impl RunningDisplay {
    /// Process id of the display program.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Waits until the program exits or `token` is cancelled, terminating it
    /// in the latter case.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Wait`] when the program's status cannot be
    /// collected.
    pub fn supervise(mut self, token: &CancellationToken) -> Result<DisplayExit, DisplayError> {
        loop {
            if let Some(status) = self
                .child
                .try_wait()
                .map_err(|source| DisplayError::Wait { source })?
            {
                info!(target: DISPLAY_TARGET, %status, "display program exited");
                return Ok(DisplayExit::Exited(status));
            }
            if token.wait_timeout(POLL_INTERVAL) {
                terminate(&mut self.child)?;
                return Ok(DisplayExit::Cancelled);
            }
        }
    }

    /// Terminates the program without waiting for cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Wait`] when the program cannot be reaped.
    pub fn terminate(mut self) -> Result<(), DisplayError> {
        terminate(&mut self.child)
    }
}

/// Sends SIGTERM, then kills the program if it outlives the grace period.
fn terminate(child: &mut Child) -> Result<(), DisplayError> {
    if let Ok(raw) = i32::try_from(child.id())
        && let Err(error) = kill(Pid::from_raw(raw), Signal::SIGTERM)
    {
        debug!(target: DISPLAY_TARGET, %error, "SIGTERM to display program failed");
    }
    let deadline = Instant::now() + TERMINATE_GRACE;
    while Instant::now() < deadline {
        if child
            .try_wait()
            .map_err(|source| DisplayError::Wait { source })?
            .is_some()
        {
            info!(target: DISPLAY_TARGET, "display program terminated");
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
    warn!(
        target: DISPLAY_TARGET,
        grace_ms = TERMINATE_GRACE.as_millis(),
        "display program ignored SIGTERM; killing"
    );
    if let Err(error) = child.kill() {
        debug!(target: DISPLAY_TARGET, %error, "kill of display program failed");
    }
    child
        .wait()
        .map(|_| ())
        .map_err(|source| DisplayError::Wait { source })
}
