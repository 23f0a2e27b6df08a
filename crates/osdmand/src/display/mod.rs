//! Display bridge: the pipe feeding the long-lived display program.
//!
//! The dispatcher writes levels into [`DisplayPipe`] through the [`LevelSink`]
//! seam. The read end becomes the standard input of the program started by
//! [`DisplaySupervisor::launch`]. The resulting [`RunningDisplay`] is
//! supervised until the daemon's cancellation token fires or the program
//! exits on its own.

mod errors;
mod level;
mod pipe;
mod supervisor;

pub use errors::DisplayError;
pub use level::Level;
pub use pipe::{DisplayPipe, LevelSink};
pub use supervisor::{DisplayExit, DisplaySupervisor, RunningDisplay};

pub(crate) const DISPLAY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::display");
