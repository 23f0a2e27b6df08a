//! Defines the unified error surface for daemon launch.

use thiserror::Error;

use osdman_config::{ConfigError, SocketPreparationError};

use crate::lifecycle::LifecycleError;
use crate::telemetry::TelemetryError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or running the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry could not be installed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Preparing the socket directory failed.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Underlying filesystem error.
        #[source]
        source: SocketPreparationError,
    },
    /// Installing signal handlers failed.
    #[error("failed to install shutdown handling: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// The daemon failed to initialise or run.
    #[error("daemon failed: {source}")]
    Lifecycle {
        /// Underlying lifecycle error.
        #[source]
        source: LifecycleError,
    },
}

impl From<ConfigError> for LaunchError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}

impl From<TelemetryError> for LaunchError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<SocketPreparationError> for LaunchError {
    fn from(source: SocketPreparationError) -> Self {
        Self::Socket { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

impl From<LifecycleError> for LaunchError {
    fn from(source: LifecycleError) -> Self {
        Self::Lifecycle { source }
    }
}
