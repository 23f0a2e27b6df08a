//! Datagram listener for trigger messages.
//!
//! The listener binds a Unix datagram socket and hands each datagram to a
//! [`TriggerHandler`] on a single background thread, one at a time and in
//! arrival order.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::handler::TriggerHandler;
pub use self::listener::{ListenerHandle, MAX_TRIGGER_BYTES, SocketCloser, TriggerListener};
#[cfg(test)]
pub(crate) use self::test_utils::RecordingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::listener");
