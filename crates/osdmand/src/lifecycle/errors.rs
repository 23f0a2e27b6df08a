use std::io;

use thiserror::Error;

use crate::display::DisplayError;
use crate::transport::ListenerError;

/// Errors raised while initialising or running the daemon.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The trigger socket could not be set up or its thread failed.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// The display pipe could not be created.
    #[error(transparent)]
    Display(#[from] DisplayError),
    /// A daemon thread could not be spawned.
    #[error("failed to spawn {activity} thread: {source}")]
    Spawn {
        activity: &'static str,
        #[source]
        source: io::Error,
    },
    /// A daemon thread panicked.
    #[error("{activity} thread panicked")]
    ThreadPanic { activity: &'static str },
}
