//! Error types for brewdb core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in brewdb core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Snapshot storage error.
    #[error("storage error: {0}")]
    Storage(#[from] brewdb_storage::StorageError),

    /// JSON codec error.
    #[error("codec error: {0}")]
    Codec(#[from] brewdb_codec::CodecError),

    /// Operation references a table absent from the store.
    #[error("table not found: {name}")]
    TableNotFound {
        /// Name of the missing table.
        name: String,
    },

    /// Table creation requested a name that is already taken.
    #[error("table already exists: {name}")]
    TableExists {
        /// Name of the duplicate table.
        name: String,
    },

    /// The filter is malformed: an unknown operator, a malformed regex,
    /// or an operand of the wrong shape.
    #[error("query error: {message}")]
    Query {
        /// Description of the problem.
        message: String,
    },

    /// A record was rejected before any row was written.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the problem.
        message: String,
    },

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound { name: name.into() }
    }

    /// Creates a table exists error.
    pub fn table_exists(name: impl Into<String>) -> Self {
        Self::TableExists { name: name.into() }
    }

    /// Creates a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Creates an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
