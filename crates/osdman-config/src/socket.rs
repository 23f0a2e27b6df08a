use std::fmt;
use std::fs::DirBuilder;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filesystem location of the daemon's datagram socket.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SocketPath(Utf8PathBuf);

impl SocketPath {
    /// Wraps a socket path.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    /// Borrows the path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        self.0.as_path()
    }

    /// Ensures the socket's parent directory exists with restrictive permissions.
    ///
    /// # Errors
    ///
    /// Returns [`SocketPreparationError`] when the path has no parent or the
    /// directory cannot be created.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(parent) = self.0.parent().filter(|parent| !parent.as_str().is_empty()) else {
            return Err(SocketPreparationError::MissingParent {
                path: self.0.clone(),
            });
        };

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        if let Err(source) = builder.create(parent.as_std_path())
            && source.kind() != std::io::ErrorKind::AlreadyExists
        {
            return Err(SocketPreparationError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            });
        }

        Ok(())
    }
}

impl fmt::Display for SocketPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "unix://{}", self.0)
    }
}

impl AsRef<std::path::Path> for SocketPath {
    fn as_ref(&self) -> &std::path::Path {
        self.0.as_std_path()
    }
}

/// Errors raised when preparing socket directories.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// Parent directory is missing when creating a Unix socket path.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent {
        /// Configured socket path.
        path: Utf8PathBuf,
    },
    /// Failed to create or adjust socket directories.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
