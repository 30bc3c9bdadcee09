//! Transaction scopes.

use crate::database::Inner;
use crate::error::CoreResult;
use crate::executor::{SelectOptions, Updater};
use crate::query::Filter;
use brewdb_codec::Record;

/// Lifecycle of a transaction scope.
///
/// A scope moves from `Active` to exactly one of the terminal states; the
/// implicit state between scopes is idle. The state is reported in tracing
/// output rather than held by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// The scope is open and operating on the working store.
    Active,
    /// The scope exited normally and its working store was persisted.
    Committed,
    /// The scope failed; the pre-scope snapshot was restored.
    RolledBack,
}

/// Handle to an active transaction scope.
///
/// Created by [`Database::transaction`](crate::Database::transaction), which
/// holds the database's exclusive lock for the whole scope. Every operation
/// here acts on the working store only; nothing is persisted until the scope
/// closure returns `Ok` and the single commit write happens.
///
/// Nested scopes cannot be expressed: opening one requires the `Database`
/// handle, and inside a scope only this handle is available.
///
/// # Example
///
/// ```no_run
/// use brewdb_core::{Database, Record};
///
/// let db = Database::open_in_memory().unwrap();
/// db.transaction(|tx| {
///     tx.create_table("users")?;
///     let mut user = Record::new();
///     user.set("name", "Alice");
///     tx.insert("users", user)?;
///     Ok(())
/// })
/// .unwrap();
/// ```
pub struct Transaction<'a> {
    inner: &'a mut Inner,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(inner: &'a mut Inner) -> Self {
        Self { inner }
    }

    /// Scans a table and returns the matching records. See
    /// [`Database::select`](crate::Database::select).
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
        self.inner.select(table, filter, &options)
    }

    /// Counts matching records.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist.
    pub fn count(&self, table: &str, filter: Option<&Filter>) -> CoreResult<usize> {
        self.inner.count(table, filter)
    }

    /// Appends one record to a table in the working store.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, or
    /// `InvalidRecord` if the record is rejected.
    pub fn insert(&mut self, table: &str, record: Record) -> CoreResult<()> {
        self.inner.insert(table, record)
    }

    /// Appends records in order; all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, or
    /// `InvalidRecord` if any record is rejected (none are inserted).
    pub fn insert_many(&mut self, table: &str, records: Vec<Record>) -> CoreResult<usize> {
        self.inner.insert_many(table, records)
    }

    /// Rewrites matching records in the working store.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist, or whatever a
    /// transform function fails with (in which case no row changed).
    pub fn update(&mut self, table: &str, filter: &Filter, updater: &Updater) -> CoreResult<usize> {
        self.inner.update(table, filter, updater)
    }

    /// Removes matching records from the working store.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist.
    pub fn delete(&mut self, table: &str, filter: &Filter) -> CoreResult<usize> {
        self.inner.delete(table, filter)
    }

    /// Registers a new empty table in the working store.
    ///
    /// # Errors
    ///
    /// Returns `TableExists` for a duplicate name, or `Query` for an
    /// invalid one.
    pub fn create_table(&mut self, name: &str) -> CoreResult<()> {
        self.inner.create_table(name)
    }

    /// Removes a table and its records from the working store.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> CoreResult<usize> {
        self.inner.drop_table(name)
    }

    /// Removes all records from a table, keeping it registered.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if the table does not exist.
    pub fn clear_table(&mut self, name: &str) -> CoreResult<usize> {
        self.inner.clear_table(name)
    }

    /// Table names in creation order, as seen by this scope.
    #[must_use]
    pub fn list_tables(&self) -> Vec<String> {
        self.inner.list_tables()
    }

    /// Whether a table exists in the working store.
    #[must_use]
    pub fn exists_table(&self, name: &str) -> bool {
        self.inner.exists_table(name)
    }
}
