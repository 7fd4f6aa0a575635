//! Error types for backends.

use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that a backend can raise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// A command referenced a table the backend does not know.
    #[error("unknown table: {name}")]
    UnknownTable {
        /// The table that was addressed.
        name: String,
    },

    /// A create-table command named a table that already exists.
    #[error("table already exists: {name}")]
    TableExists {
        /// The duplicated table name.
        name: String,
    },

    /// A mutating command or commit/rollback arrived outside a transaction.
    #[error("no transaction is active")]
    NoTransaction,

    /// `begin` was called while a transaction was already open.
    #[error("a transaction is already active")]
    NestedTransaction,

    /// A driver-level failure (connection loss, constraint violation, an
    /// injected test fault, ...).
    #[error("backend failure: {message}")]
    Failure {
        /// Description of the failure.
        message: String,
    },
}

impl BackendError {
    /// Creates an unknown-table error.
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Self::UnknownTable { name: name.into() }
    }

    /// Creates a table-exists error.
    pub fn table_exists(name: impl Into<String>) -> Self {
        Self::TableExists { name: name.into() }
    }

    /// Creates a generic driver failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }
}
