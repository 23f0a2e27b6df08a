use std::io;

use thiserror::Error;

/// Errors raised by the display pipe and its supervisor.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Creating the OS pipe failed.
    #[error("failed to create display pipe: {source}")]
    Pipe {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The pipe has already been closed.
    #[error("display pipe is closed")]
    Closed,
    /// Writing a level into the pipe failed.
    #[error("failed to write level to display pipe: {source}")]
    Write {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The read end was already handed to a display program.
    #[error("display pipe reader already taken")]
    ReaderTaken,
    /// The display program could not be started.
    #[error("failed to start display program `{command}` via '{shell}': {source}")]
    Spawn {
        /// Shell used to launch the program.
        shell: String,
        /// Display command line.
        command: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Waiting on the display program failed.
    #[error("failed to wait for display program: {source}")]
    Wait {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
