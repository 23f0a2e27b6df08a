use std::io::{self, PipeReader, PipeWriter, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{DISPLAY_TARGET, DisplayError, Level};

/// Destination for levels produced by the dispatcher.
pub trait LevelSink: Send + Sync {
    /// Forwards one level to the display.
    fn send(&self, level: Level) -> Result<(), DisplayError>;
}

impl<T> LevelSink for Arc<T>
where
    T: LevelSink + ?Sized,
{
    fn send(&self, level: Level) -> Result<(), DisplayError> {
        (**self).send(level)
    }
}

/// OS pipe whose read end feeds the display program.
///
/// Writers clone the write end out of the lock before writing, so a blocked
/// write never prevents [`DisplayPipe::close`] from completing.
#[derive(Debug)]
pub struct DisplayPipe {
    writer: Mutex<Option<Arc<PipeWriter>>>,
    reader: Mutex<Option<PipeReader>>,
}

impl DisplayPipe {
    /// Creates the pipe with both ends open.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Pipe`] when the OS refuses to create the pipe.
    pub fn open() -> Result<Self, DisplayError> {
        let (reader, writer) = io::pipe().map_err(|source| DisplayError::Pipe { source })?;
        Ok(Self {
            writer: Mutex::new(Some(Arc::new(writer))),
            reader: Mutex::new(Some(reader)),
        })
    }

    /// Hands the read end to the display program.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::ReaderTaken`] after the first call and
    /// [`DisplayError::Closed`] once the pipe is closed.
    pub fn take_reader(&self) -> Result<PipeReader, DisplayError> {
        if self.is_closed() {
            return Err(DisplayError::Closed);
        }
        lock(&self.reader).take().ok_or(DisplayError::ReaderTaken)
    }

    /// Closes both ends. Repeated calls are no-ops.
    pub fn close(&self) {
        let writer = lock(&self.writer).take();
        let reader = lock(&self.reader).take();
        if writer.is_some() || reader.is_some() {
            debug!(target: DISPLAY_TARGET, "display pipe closed");
        }
    }

    /// Reports whether [`DisplayPipe::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        lock(&self.writer).is_none()
    }
}

impl LevelSink for DisplayPipe {
    fn send(&self, level: Level) -> Result<(), DisplayError> {
        let writer = lock(&self.writer).clone().ok_or(DisplayError::Closed)?;
        let mut handle: &PipeWriter = &writer;
        handle
            .write_all(level.to_line().as_bytes())
            .map_err(|source| DisplayError::Write { source })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
