//! Process-level concerns: launching the daemon and observing signals.

mod errors;
mod launch;
mod shutdown;

pub use errors::LaunchError;
pub use launch::{run_daemon, run_daemon_with_config};
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
