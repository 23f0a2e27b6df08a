//! Launch sequencing for the foreground daemon.

use std::sync::Arc;

use osdman_config::Config;
use tracing::info;

use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::lifecycle::{Daemon, DaemonServices};
use crate::runner::ShellCommandRunner;
use crate::telemetry;

use super::errors::LaunchError;
use super::shutdown::SystemShutdownSignal;
use super::PROCESS_TARGET;

/// Loads the configuration from its default location and runs the daemon.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, telemetry, or daemon startup
/// fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with_config(Config::load()?)
}

/// Runs the daemon in the foreground until a termination signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when telemetry, signal handling, or daemon startup
/// fails.
pub fn run_daemon_with_config(config: Config) -> Result<(), LaunchError> {
    telemetry::initialise(&config)?;
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    launch(config, Arc::clone(&reporter)).inspect_err(|error| reporter.launch_failed(error))
}

fn launch(config: Config, reporter: Arc<dyn HealthReporter>) -> Result<(), LaunchError> {
    config.daemon_socket().prepare_filesystem()?;
    let signal = Arc::new(SystemShutdownSignal::install()?);
    let runner = ShellCommandRunner::new(config.shell());
    let daemon = Daemon::initialise(
        Arc::new(config),
        runner,
        DaemonServices { signal, reporter },
    )?;
    info!(
        target: PROCESS_TARGET,
        socket = %daemon.socket_path(),
        "daemon initialised"
    );
    daemon.run()?;
    Ok(())
}
