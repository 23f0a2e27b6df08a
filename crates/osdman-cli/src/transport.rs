//! Datagram transport from the CLI to the daemon.

use std::os::unix::net::UnixDatagram;

use osdman_config::SocketPath;

use super::AppError;

/// Sends one `domain/verb` datagram and returns the number of bytes written.
///
/// The protocol is fire-and-forget: nothing is read back.
pub(super) fn send_trigger(socket: &SocketPath, domain: &str, verb: &str) -> Result<usize, AppError> {
    let client = UnixDatagram::unbound().map_err(AppError::Socket)?;
    client
        .send_to(format!("{domain}/{verb}").as_bytes(), socket)
        .map_err(|source| AppError::Send {
            endpoint: socket.to_string(),
            source,
        })
}
