//! In-memory snapshot backend for testing.

use crate::backend::SnapshotBackend;
use crate::error::{StorageError, StorageResult};

/// An in-memory snapshot backend.
///
/// This backend keeps the snapshot in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// It can also inject a failure on the next `store`, which tests use to
/// exercise commit-failure paths.
///
/// # Example
///
/// ```
/// use brewdb_storage::{InMemoryBackend, SnapshotBackend};
///
/// let mut backend = InMemoryBackend::new();
/// assert_eq!(backend.load().unwrap(), None);
/// backend.store(b"{}").unwrap();
/// assert_eq!(backend.load().unwrap(), Some(b"{}".to_vec()));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    snapshot: Option<Vec<u8>>,
    fail_next_store: bool,
}

impl InMemoryBackend {
    /// Creates a new backend with no snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with a pre-existing snapshot.
    ///
    /// Useful for testing load paths against prepared content.
    #[must_use]
    pub fn with_snapshot(snapshot: Vec<u8>) -> Self {
        Self {
            snapshot: Some(snapshot),
            fail_next_store: false,
        }
    }

    /// Makes the next `store` call fail, leaving the snapshot unchanged.
    pub fn fail_next_store(&mut self) {
        self.fail_next_store = true;
    }

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.snapshot.clone()
    }
}

impl SnapshotBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.snapshot.clone())
    }

    fn store(&mut self, snapshot: &[u8]) -> StorageResult<()> {
        if self.fail_next_store {
            self.fail_next_store = false;
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected store failure",
            )));
        }
        self.snapshot = Some(snapshot.to_vec());
        Ok(())
    }
}
