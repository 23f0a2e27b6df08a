//! Trigger dispatch: from a raw datagram to a level on the display.
//!
//! A trigger names a domain and a verb separated by the first `/`:
//!
//! ```text
//! volume/up
//! ```
//!
//! The dispatcher runs the verb's command, then the domain's measurement
//! command, and forwards the truncated measurement to the display. Failures at
//! any step are logged and abandon the trigger; they never stop the listener.

mod errors;
mod handler;
mod request;

pub use self::errors::{DispatchError, TriggerParseError};
pub use self::handler::Dispatcher;
pub use self::request::TriggerRequest;

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
