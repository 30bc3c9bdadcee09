//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Writing the replacement snapshot failed before it became current.
    ///
    /// The previous snapshot is still intact at the target path.
    #[error("failed to write snapshot {}: {source}", path.display())]
    WriteFailed {
        /// The target path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// Copying the current snapshot to its backup path failed.
    #[error("failed to back up snapshot {}: {source}", path.display())]
    BackupFailed {
        /// The backup path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },
}

impl StorageError {
    /// Creates a write failure for the given target path.
    pub fn write_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Creates a backup failure for the given backup path.
    pub fn backup_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::BackupFailed {
            path: path.into(),
            source,
        }
    }
}
