//! Snapshot backend trait definition.

use crate::error::StorageResult;

/// A whole-snapshot storage backend for brewdb.
///
/// Snapshot backends are **opaque byte stores**. Each `store` call replaces
/// the entire previous snapshot with a new one; `load` returns the most
/// recently stored snapshot in full. brewdb owns all file format
/// interpretation - backends do not understand tables, records, or JSON.
///
/// # Invariants
///
/// - `store` is all-or-nothing: after a failure, `load` still returns the
///   previous snapshot unchanged
/// - After `store` returns successfully, the new snapshot is durable
/// - `load` returns `None` only when no snapshot has ever been stored
///
/// # Implementors
///
/// - [`super::FileBackend`] - persistent storage with atomic replacement
/// - [`super::InMemoryBackend`] - for testing
pub trait SnapshotBackend: Send {
    /// Loads the current snapshot.
    ///
    /// Returns `None` if no snapshot exists yet (e.g. the backing file was
    /// never written).
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Atomically replaces the current snapshot.
    ///
    /// Either the whole new snapshot becomes current, or the previous one
    /// is left intact. After this returns successfully, the new snapshot
    /// survives process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be made durable. The previous
    /// snapshot is unaffected.
    fn store(&mut self, snapshot: &[u8]) -> StorageResult<()>;
}
