use std::io;
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until a termination signal arrives, returning its number, or
    /// until [`ShutdownSignal::release`] is called, returning `None`.
    fn wait(&self) -> Option<i32>;

    /// Unblocks any current or future [`ShutdownSignal::wait`].
    fn release(&self);
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener for SIGTERM, SIGINT, SIGQUIT and SIGHUP.
///
/// Handlers are installed on construction, so signals that arrive before the
/// watcher thread starts waiting are not lost.
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
    handle: Handle,
}

impl SystemShutdownSignal {
    /// Installs the signal handlers.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when registration fails.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        Ok(Self {
            signals: Mutex::new(signals),
            handle,
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Option<i32> {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        let received = signals.forever().next();
        if let Some(signal) = received {
            info!(target: PROCESS_TARGET, signal, "shutdown signal received");
        }
        received
    }

    fn release(&self) {
        self.handle.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn release_unblocks_wait() {
        let signal = Arc::new(SystemShutdownSignal::install().expect("install handlers"));
        let waiter = Arc::clone(&signal);
        let worker = thread::spawn(move || waiter.wait());

        signal.release();
        assert_eq!(worker.join().expect("join waiter"), None);
    }
}
