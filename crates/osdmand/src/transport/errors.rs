//! Error types for the trigger listener.

use std::io;

use thiserror::Error;

/// Errors surfaced while binding or running the trigger listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind trigger socket at {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("existing trigger socket {path} is already in use")]
    InUse { path: String },
    #[error("trigger socket path {path} is not a socket")]
    NotSocket { path: String },
    #[error("failed to read metadata for trigger socket {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to probe existing trigger socket {path}: {source}")]
    Probe {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove stale trigger socket {path}: {source}")]
    StaleCleanup {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to restrict permissions on trigger socket {path}: {source}")]
    Permissions {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to configure trigger socket: {source}")]
    Configure {
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn listener thread: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
    #[error("listener thread panicked")]
    ThreadPanic,
}
