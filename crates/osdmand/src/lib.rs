//! The osdman daemon.
//!
//! The daemon listens on a per-user Unix datagram socket for triggers of the
//! form `domain/verb`. For each trigger it runs the verb's shell command, then
//! the domain's measurement command, and writes the measured level as an
//! integer line into the standard input of a long-lived display program such
//! as `wob`.
//!
//! Three threads make up a running daemon: the trigger listener, the display
//! supervisor, and the signal watcher. Triggers are handled one at a time in
//! arrival order on the listener thread, so a slow command delays the next
//! trigger. Shutdown, whether caused by a signal or by [`DaemonCloser::close`],
//! cancels a shared [`CancellationToken`] and runs the cleanup actions exactly
//! once: the socket is shut down and its path removed, then the display pipe
//! is closed.

pub mod dispatch;
pub mod display;
mod health;
pub mod lifecycle;
mod process;
pub mod runner;
mod telemetry;
pub mod transport;

pub use health::{HealthReporter, StructuredHealthReporter};
pub use lifecycle::{
    CancellationToken, Daemon, DaemonCloser, DaemonServices, LifecycleError, LifecycleState,
    ShutdownTrigger,
};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon,
    run_daemon_with_config,
};
pub use runner::{CommandError, CommandRunner, ShellCommandRunner};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
