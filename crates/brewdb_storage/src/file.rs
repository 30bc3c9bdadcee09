//! File-based snapshot backend.

use crate::backend::SnapshotBackend;
use crate::error::{StorageError, StorageResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file-based snapshot backend.
///
/// The snapshot lives in a single file. Replacement uses the
/// write-then-rename pattern for crash safety:
///
/// 1. Write the new snapshot to a co-located `<file>.tmp`
/// 2. Sync the temporary file to disk
/// 3. Optionally copy the current file to `<stem>.backup`
/// 4. Rename the temporary file over the target
/// 5. Fsync the directory so the rename is durable
///
/// A crash at any point leaves either the old file intact or the new file
/// fully in place, never a half-written file at the target path. A failure
/// at any step reports an error and leaves the target untouched.
///
/// # Example
///
/// ```no_run
/// use brewdb_storage::{FileBackend, SnapshotBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::new(Path::new("data.json"), true);
/// backend.store(b"{}").unwrap();
/// assert_eq!(backend.load().unwrap(), Some(b"{}".to_vec()));
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    backup: bool,
}

impl FileBackend {
    /// Creates a backend for the given path.
    ///
    /// The file itself is not touched until the first `store`; a missing
    /// file simply loads as `None`. When `backup` is enabled, every `store`
    /// first copies the current file to the backup path.
    #[must_use]
    pub fn new(path: &Path, backup: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            backup,
        }
    }

    /// Returns the path to the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path the previous snapshot is copied to before
    /// replacement, when backups are enabled.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("backup")
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Fsyncs the containing directory so a completed rename is durable.
    fn sync_directory(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                File::open(parent)?.sync_all()?;
            }
        }
        Ok(())
    }
}

impl SnapshotBackend for FileBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&self.path)?))
    }

    fn store(&mut self, snapshot: &[u8]) -> StorageResult<()> {
        let temp_path = self.temp_path();

        let write_temp = || -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(snapshot)?;
            file.sync_all()?;
            Ok(())
        };
        if let Err(source) = write_temp() {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::write_failed(&self.path, source));
        }

        if self.backup && self.path.exists() {
            let backup_path = self.backup_path();
            if let Err(source) = fs::copy(&self.path, &backup_path) {
                let _ = fs::remove_file(&temp_path);
                return Err(StorageError::backup_failed(backup_path, source));
            }
        }

        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::write_failed(&self.path, source));
        }

        self.sync_directory()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"), true);
        assert_eq!(backend.load().unwrap(), None);
    }

    #[test]
    fn store_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let mut backend = FileBackend::new(&path, false);
        backend.store(b"{\"a\": 1}").unwrap();

        assert_eq!(backend.load().unwrap(), Some(b"{\"a\": 1}".to_vec()));
        assert!(path.exists());
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn second_store_backs_up_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let mut backend = FileBackend::new(&path, true);
        backend.store(b"first").unwrap();
        assert!(!backend.backup_path().exists());

        backend.store(b"second").unwrap();
        assert_eq!(fs::read(backend.backup_path()).unwrap(), b"first");
        assert_eq!(backend.load().unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn backups_can_be_disabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let mut backend = FileBackend::new(&path, false);
        backend.store(b"first").unwrap();
        backend.store(b"second").unwrap();

        assert!(!backend.backup_path().exists());
    }

    #[test]
    fn orphaned_temp_file_does_not_shadow_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let mut backend = FileBackend::new(&path, true);
        backend.store(b"committed").unwrap();

        // Simulate a crash after the temp write but before the rename.
        fs::write(backend.temp_path(), b"half-finished").unwrap();

        let reopened = FileBackend::new(&path, true);
        assert_eq!(reopened.load().unwrap(), Some(b"committed".to_vec()));
    }

    #[test]
    fn store_into_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("db.json");

        let mut backend = FileBackend::new(&path, true);
        let result = backend.store(b"data");

        assert!(matches!(result, Err(StorageError::WriteFailed { .. })));
        assert!(!path.exists());
    }
}
