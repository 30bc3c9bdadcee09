//! Database facade.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::executor::{self, SelectOptions, Updater};
use crate::query::Filter;
use crate::stats::{self, DatabaseInfo, TableStats};
use crate::store::Store;
use crate::transaction::{Transaction, TransactionState};
use brewdb_codec::Record;
use brewdb_storage::{FileBackend, InMemoryBackend, SnapshotBackend};
use parking_lot::Mutex;
use std::path::Path;
use tracing::{debug, info, warn};

/// The main database handle.
///
/// `Database` is the primary entry point for working with brewdb. It owns
/// the one shared store per open handle and provides:
/// - Record operations (`select`, `insert`, `update`, `delete`, `count`)
/// - Table lifecycle (`create_table`, `drop_table`, `clear_table`)
/// - Transaction scopes with snapshot rollback
/// - Statistics and info reporting
///
/// # Locking
///
/// One exclusive lock guards every public entry point, reads and writes
/// alike, so observable state never interleaves. A transaction scope is a
/// single acquisition; the scope's [`Transaction`] handle reaches the shared
/// state through the already-held guard rather than re-locking.
///
/// # Opening a Database
///
/// ```no_run
/// use brewdb_core::{Database, Record};
/// use std::path::Path;
///
/// let db = Database::open(Path::new("app.json")).unwrap();
/// db.create_table("users").unwrap();
///
/// let mut user = Record::new();
/// user.set("name", "Alice");
/// db.insert("users", user).unwrap();
/// ```
///
/// # In-Memory Databases
///
/// For testing, use [`Database::open_in_memory`].
pub struct Database {
    inner: Mutex<Inner>,
}

/// Shared state behind the handle's lock.
///
/// Methods here assume exclusive access and never persist by themselves;
/// commit points live in `Database`.
pub(crate) struct Inner {
    store: Store,
    backend: Box<dyn SnapshotBackend>,
    path: String,
}

impl Database {
    /// Opens a database file with the default configuration.
    ///
    /// A missing file is synthesized as an empty store; it is first written
    /// on the first successful commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a database file with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if it is missing and `create_if_missing` is disabled.
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        let backend = FileBackend::new(path, config.backup);
        Self::open_with_backend(Box::new(backend), path.display().to_string(), config)
    }

    /// Opens a fresh in-memory database for testing.
    ///
    /// Data is lost when the handle is dropped.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other constructors.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open_with_backend(
            Box::new(InMemoryBackend::new()),
            ":memory:".to_string(),
            Config::default(),
        )
    }

    /// Opens a database over a pre-configured backend.
    ///
    /// This is a lower-level constructor; prefer [`Database::open`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend holds a snapshot that cannot be
    /// parsed. A malformed snapshot is a load failure, never silently
    /// treated as empty.
    pub fn open_with_backend(
        backend: Box<dyn SnapshotBackend>,
        path: String,
        config: Config,
    ) -> CoreResult<Self> {
        let store = match backend.load()? {
            Some(bytes) => {
                let text = String::from_utf8(bytes).map_err(|_| {
                    CoreError::Codec(brewdb_codec::CodecError::invalid_document(
                        "database file is not valid UTF-8",
                    ))
                })?;
                Store::decode(&text)?
            }
            None => {
                if !config.create_if_missing {
                    return Err(CoreError::invalid_operation(
                        "database does not exist and create_if_missing is false",
                    ));
                }
                debug!(path = %path, "creating fresh store");
                Store::new(&config.format_version)
            }
        };

        Ok(Self {
            inner: Mutex::new(Inner {
                store,
                backend,
                path,
            }),
        })
    }

    /// Scans a table and returns the matching records.
    ///
    /// Matching rows are kept in insertion order, sorted if `order_by` is
    /// set (stable; missing/null keys sort below any present value), then
    /// offset/limit are applied, then the projection. The table itself is
    /// never mutated.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist.
    pub fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        options: SelectOptions,
    ) -> CoreResult<Vec<Record>> {
        self.inner.lock().select(table, filter, &options)
    }

    /// Counts matching records without materializing them.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist.
    pub fn count(&self, table: &str, filter: Option<&Filter>) -> CoreResult<usize> {
        self.inner.lock().count(table, filter)
    }

    /// Appends one record to a table and commits.
    ///
    /// Both reserved timestamps are stamped; caller-supplied values for them
    /// are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, `InvalidRecord`
    /// if the record is rejected, or a persistence error (in which case the
    /// store is unchanged).
    pub fn insert(&self, table: &str, record: Record) -> CoreResult<()> {
        self.mutate(|inner| {
            inner.insert(table, record)?;
            Ok(((), true))
        })
    }

    /// Appends records in call order and commits; all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, `InvalidRecord`
    /// if any record is rejected (none are inserted), or a persistence
    /// error (store unchanged).
    pub fn insert_many(&self, table: &str, records: Vec<Record>) -> CoreResult<usize> {
        self.mutate(|inner| {
            let count = inner.insert_many(table, records)?;
            Ok((count, count > 0))
        })
    }

    /// Rewrites matching records and commits, returning how many changed.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, whatever a
    /// transform function fails with (no row changed), or a persistence
    /// error (store unchanged).
    pub fn update(&self, table: &str, filter: &Filter, updater: &Updater) -> CoreResult<usize> {
        self.mutate(|inner| {
            let changed = inner.update(table, filter, updater)?;
            Ok((changed, changed > 0))
        })
    }

    /// Removes matching records and commits, returning how many were
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, or a
    /// persistence error (store unchanged).
    pub fn delete(&self, table: &str, filter: &Filter) -> CoreResult<usize> {
        self.mutate(|inner| {
            let removed = inner.delete(table, filter)?;
            Ok((removed, removed > 0))
        })
    }

    /// Creates a new empty table and commits.
    ///
    /// # Errors
    ///
    /// Returns `TableExists` for a duplicate name, `Query` for an invalid
    /// one, or a persistence error (store unchanged).
    pub fn create_table(&self, name: &str) -> CoreResult<()> {
        self.mutate(|inner| {
            inner.create_table(name)?;
            Ok(((), true))
        })
    }

    /// Drops a table and its records, commits, and returns the removed row
    /// count.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, or a
    /// persistence error (store unchanged).
    pub fn drop_table(&self, name: &str) -> CoreResult<usize> {
        self.mutate(|inner| {
            let rows = inner.drop_table(name)?;
            Ok((rows, true))
        })
    }

    /// Removes all rows from a table but keeps it registered; commits.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, or a
    /// persistence error (store unchanged).
    pub fn clear_table(&self, name: &str) -> CoreResult<usize> {
        self.mutate(|inner| {
            let rows = inner.clear_table(name)?;
            Ok((rows, true))
        })
    }

    /// Table names in creation order.
    #[must_use]
    pub fn list_tables(&self) -> Vec<String> {
        self.inner.lock().list_tables()
    }

    /// Whether a table exists.
    #[must_use]
    pub fn exists_table(&self, name: &str) -> bool {
        self.inner.lock().exists_table(name)
    }

    /// Per-field statistics for a table.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist.
    pub fn stats(&self, table: &str) -> CoreResult<TableStats> {
        self.inner.lock().stats(table)
    }

    /// Database metadata and per-table row counts.
    #[must_use]
    pub fn info(&self) -> DatabaseInfo {
        self.inner.lock().info()
    }

    /// Runs a transaction scope.
    ///
    /// The closure's operations act on the working store. If it returns
    /// `Ok`, the whole working store is committed in one atomic write; if it
    /// returns `Err`, or the commit write itself fails, the pre-scope
    /// snapshot is restored and the original error propagates unchanged, so
    /// the caller sees exactly the failure it would have seen without the
    /// scope, plus the guarantee that no partial state was committed.
    ///
    /// # Errors
    ///
    /// Whatever the closure fails with, or a persistence error from the
    /// commit write.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let mut inner = self.inner.lock();
        let snapshot = inner.store.clone();
        debug!(state = ?TransactionState::Active, "transaction scope entered");

        let result = f(&mut Transaction::new(&mut inner));
        match result {
            Ok(value) => match inner.persist() {
                Ok(()) => {
                    debug!(state = ?TransactionState::Committed, "transaction committed");
                    Ok(value)
                }
                Err(err) => {
                    inner.store = snapshot;
                    warn!(
                        state = ?TransactionState::RolledBack,
                        error = %err,
                        "commit write failed; snapshot restored"
                    );
                    Err(err)
                }
            },
            Err(err) => {
                inner.store = snapshot;
                warn!(
                    state = ?TransactionState::RolledBack,
                    error = %err,
                    "transaction rolled back"
                );
                Err(err)
            }
        }
    }

    /// Runs one mutation as an implicit single-operation transaction.
    ///
    /// The closure reports whether it actually changed anything; unchanged
    /// stores skip the commit write. On any failure the pre-call snapshot is
    /// restored, so a failed operation leaves the store exactly as it was.
    fn mutate<T>(&self, f: impl FnOnce(&mut Inner) -> CoreResult<(T, bool)>) -> CoreResult<T> {
        let mut inner = self.inner.lock();
        let snapshot = inner.store.clone();

        let outcome: CoreResult<T> = (|| {
            let (value, dirty) = f(&mut inner)?;
            if dirty {
                inner.persist()?;
            }
            Ok(value)
        })();

        match outcome {
            Ok(value) => Ok(value),
            Err(err) => {
                inner.store = snapshot;
                Err(err)
            }
        }
    }
}

impl Inner {
    pub(crate) fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        options: &SelectOptions,
    ) -> CoreResult<Vec<Record>> {
        let rows = executor::select(self.store.table(table)?, filter, options);
        debug!(table, rows = rows.len(), "select");
        Ok(rows)
    }

    pub(crate) fn count(&self, table: &str, filter: Option<&Filter>) -> CoreResult<usize> {
        Ok(executor::count(self.store.table(table)?, filter))
    }

    pub(crate) fn insert(&mut self, table: &str, record: Record) -> CoreResult<()> {
        executor::insert(self.store.table_mut(table)?, record)?;
        debug!(table, "inserted 1 row");
        Ok(())
    }

    pub(crate) fn insert_many(&mut self, table: &str, records: Vec<Record>) -> CoreResult<usize> {
        let count = executor::insert_many(self.store.table_mut(table)?, records)?;
        debug!(table, rows = count, "inserted rows");
        Ok(count)
    }

    pub(crate) fn update(
        &mut self,
        table: &str,
        filter: &Filter,
        updater: &Updater,
    ) -> CoreResult<usize> {
        let changed = executor::update(self.store.table_mut(table)?, filter, updater)?;
        debug!(table, rows = changed, "updated rows");
        Ok(changed)
    }

    pub(crate) fn delete(&mut self, table: &str, filter: &Filter) -> CoreResult<usize> {
        let removed = executor::delete(self.store.table_mut(table)?, filter);
        debug!(table, rows = removed, "deleted rows");
        Ok(removed)
    }

    pub(crate) fn create_table(&mut self, name: &str) -> CoreResult<()> {
        self.store.create_table(name)?;
        info!(table = name, "table created");
        Ok(())
    }

    pub(crate) fn drop_table(&mut self, name: &str) -> CoreResult<usize> {
        let table = self.store.drop_table(name)?;
        info!(table = name, rows = table.len(), "table dropped");
        Ok(table.len())
    }

    pub(crate) fn clear_table(&mut self, name: &str) -> CoreResult<usize> {
        let table = self.store.table_mut(name)?;
        let rows = table.len();
        table.clear();
        info!(table = name, rows, "table cleared");
        Ok(rows)
    }

    pub(crate) fn list_tables(&self) -> Vec<String> {
        self.store.table_names()
    }

    pub(crate) fn exists_table(&self, name: &str) -> bool {
        self.store.contains_table(name)
    }

    pub(crate) fn stats(&self, table: &str) -> CoreResult<TableStats> {
        Ok(stats::table_stats(table, self.store.table(table)?)?)
    }

    pub(crate) fn info(&self) -> DatabaseInfo {
        stats::database_info(&self.path, &self.store)
    }

    /// Commits the working store: metadata is refreshed and the serialized
    /// form replaces the previous snapshot atomically.
    pub(crate) fn persist(&mut self) -> CoreResult<()> {
        self.store.sync_meta();
        let text = self.store.encode()?;
        self.backend.store(text.as_bytes())?;
        debug!(bytes = text.len(), "store persisted");
        Ok(())
    }
}
