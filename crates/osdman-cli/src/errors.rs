//! Error types for the CLI runtime.

use std::io;

use osdman_config::ConfigError;
use osdmand::LaunchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[source] ConfigError),
    #[error("failed to create client socket: {0}")]
    Socket(#[source] io::Error),
    #[error("failed to send trigger to daemon at {endpoint}: {source}")]
    Send {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("unknown domain '{0}'")]
    UnknownDomain(String),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    #[error(transparent)]
    Daemon(#[from] LaunchError),
}
