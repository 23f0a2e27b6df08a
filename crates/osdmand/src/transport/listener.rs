//! Listener implementation for the trigger socket.

use std::fs::{self, Permissions};
use std::io;
use std::net::Shutdown;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use osdman_config::SocketPath;
use tracing::{debug, info, warn};

use super::{LISTENER_TARGET, ListenerError, TriggerHandler};
use crate::lifecycle::CancellationToken;

/// Largest datagram read in full; longer datagrams are truncated.
pub const MAX_TRIGGER_BYTES: usize = 1024;

const RECEIVE_POLL: Duration = Duration::from_millis(100);
const SOCKET_MODE: u32 = 0o600;

/// Datagram socket bound at the daemon's trigger path.
#[derive(Debug)]
pub struct TriggerListener {
    path: SocketPath,
    socket: UnixDatagram,
}

impl TriggerListener {
    /// Binds the trigger socket, replacing a stale socket file if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::InUse`] when another process still serves the
    /// path, and other variants when the path cannot be inspected, cleaned,
    /// bound, or configured.
    pub fn bind(path: &SocketPath) -> Result<Self, ListenerError> {
        let std_path = path.as_path().as_std_path();
        remove_stale_socket(std_path)?;
        let socket = UnixDatagram::bind(std_path).map_err(|source| ListenerError::Bind {
            path: path.to_string(),
            source,
        })?;
        let listener = Self {
            path: path.clone(),
            socket,
        };
        if let Err(error) = listener.configure() {
            remove_socket_file(std_path);
            return Err(error);
        }
        Ok(listener)
    }

    fn configure(&self) -> Result<(), ListenerError> {
        fs::set_permissions(&self.path, Permissions::from_mode(SOCKET_MODE)).map_err(
            |source| ListenerError::Permissions {
                path: self.path.to_string(),
                source,
            },
        )?;
        self.socket
            .set_read_timeout(Some(RECEIVE_POLL))
            .map_err(|source| ListenerError::Configure { source })
    }

    /// Path the socket is bound at.
    #[must_use]
    pub fn path(&self) -> &SocketPath {
        &self.path
    }

    /// Returns a closer that shuts the socket down and removes its path.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Configure`] when the socket cannot be cloned.
    pub fn closer(&self) -> Result<SocketCloser, ListenerError> {
        let socket = self
            .socket
            .try_clone()
            .map_err(|source| ListenerError::Configure { source })?;
        Ok(SocketCloser {
            path: self.path.as_path().as_std_path().to_path_buf(),
            socket,
        })
    }

    /// Starts the receive loop on a dedicated thread.
    ///
    /// The loop ends when `token` is cancelled or the socket fails. A failure
    /// that was not caused by shutdown cancels `token` so the rest of the
    /// daemon winds down too.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Spawn`] when the thread cannot be created.
    pub fn start<H>(self, handler: H, token: CancellationToken) -> Result<ListenerHandle, ListenerError>
    where
        H: TriggerHandler,
    {
        let handle = thread::Builder::new()
            .name("trigger-listener".into())
            .spawn(move || self.run_receive_loop(&handler, &token))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            handle: Some(handle),
        })
    }

    fn run_receive_loop(&self, handler: &impl TriggerHandler, token: &CancellationToken) {
        info!(
            target: LISTENER_TARGET,
            socket = %self.path,
            "trigger listener active"
        );
        let mut buffer = [0_u8; MAX_TRIGGER_BYTES];
        while !token.is_cancelled() {
            match self.socket.recv(&mut buffer) {
                Ok(_) if token.is_cancelled() => break,
                Ok(len) => handler.handle(&buffer[..len]),
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) => {}
                Err(error) => {
                    if !token.is_cancelled() {
                        warn!(
                            target: LISTENER_TARGET,
                            error = %error,
                            "trigger socket receive failed; stopping"
                        );
                        token.cancel();
                    }
                    break;
                }
            }
        }
        info!(target: LISTENER_TARGET, "trigger listener stopped");
    }
}

/// Shuts the trigger socket down and removes its filesystem path.
#[derive(Debug)]
pub struct SocketCloser {
    path: PathBuf,
    socket: UnixDatagram,
}

impl SocketCloser {
    /// Closes the socket. Failures are logged, never propagated.
    pub fn close(self) {
        if let Err(error) = self.socket.shutdown(Shutdown::Both) {
            debug!(target: LISTENER_TARGET, %error, "trigger socket shutdown failed");
        }
        drop(self.socket);
        remove_socket_file(&self.path);
    }
}

/// Handle to the background receive loop.
#[derive(Debug)]
pub struct ListenerHandle {
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Waits for the receive loop to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the loop panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic),
            None => Ok(()),
        }
    }
}

fn remove_stale_socket(path: &Path) -> Result<(), ListenerError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(ListenerError::Metadata {
                path: path.display().to_string(),
                source,
            });
        }
    };
    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotSocket {
            path: path.display().to_string(),
        });
    }
    let probe = UnixDatagram::unbound().map_err(|source| ListenerError::Probe {
        path: path.display().to_string(),
        source,
    })?;
    match probe.connect(path) {
        Ok(()) => Err(ListenerError::InUse {
            path: path.display().to_string(),
        }),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            info!(
                target: LISTENER_TARGET,
                path = %path.display(),
                "removing stale trigger socket"
            );
            fs::remove_file(path).map_err(|source| ListenerError::StaleCleanup {
                path: path.display().to_string(),
                source,
            })
        }
        Err(source) => Err(ListenerError::Probe {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn remove_socket_file(path: &Path) {
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path.display(),
            "failed to remove trigger socket file"
        );
    }
}
