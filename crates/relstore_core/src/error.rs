//! Error types for RelStore core.

use relstore_backend::BackendError;
use relstore_model::ValueError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in RelStore core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backend error outside the commit/rollback path.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A command or commit failed; the transaction was rolled back.
    #[error("{operation} failed (rolled back): {source}")]
    TransactionFailed {
        /// The orchestrator operation that failed.
        operation: &'static str,
        /// The original failure.
        source: BackendError,
    },

    /// A command or commit failed and the rollback attempt also failed.
    ///
    /// Both failures are surfaced; neither is swallowed.
    #[error("{operation} failed ({commit}); rollback also failed: {rollback}")]
    RollbackFailed {
        /// The orchestrator operation that failed.
        operation: &'static str,
        /// The original failure.
        commit: BackendError,
        /// The failure raised by the rollback attempt.
        rollback: BackendError,
    },

    /// An index was out of range for a container mutator.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The container length at the time of the call.
        len: usize,
    },

    /// A key was not present in a relation map.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// Display form of the missing key.
        key: String,
    },

    /// `repopulate` was called on a container with unsaved state.
    #[error("repopulate requires a clean container (no pending deletions, all elements saved)")]
    DirtyRepopulate,

    /// `repopulate` would collide with an element already present.
    #[error("duplicate element during repopulate: {element}")]
    DuplicateElement {
        /// Display form of the duplicated element or key.
        element: String,
    },

    /// A batch contained an entity type that was never registered.
    #[error("entity type not registered: {type_name}")]
    UnregisteredType {
        /// The unregistered type's name.
        type_name: &'static str,
    },

    /// An entity was asked about a relation table it does not own.
    #[error("unknown relation table: {table}")]
    UnknownRelationTable {
        /// The table that was addressed.
        table: String,
    },

    /// A row did not match the shape an entity factory expected.
    #[error("row shape mismatch in table {table}: {reason}")]
    RowShape {
        /// The table the row came from.
        table: String,
        /// What was wrong.
        reason: String,
    },

    /// A relation row referenced an owner key with no loaded entity.
    #[error("orphan relation row in table {table}")]
    OrphanRow {
        /// The relation table holding the orphan.
        table: String,
    },

    /// The foreign-key graph over the touched tables contains a cycle.
    #[error("cyclic foreign-key reference involving table {table}")]
    CyclicReference {
        /// A table on the cycle.
        table: String,
    },
}

impl CoreError {
    /// Creates a key-not-found error.
    pub fn key_not_found(key: impl std::fmt::Debug) -> Self {
        Self::KeyNotFound {
            key: format!("{key:?}"),
        }
    }

    /// Creates a duplicate-element error.
    pub fn duplicate_element(element: impl std::fmt::Debug) -> Self {
        Self::DuplicateElement {
            element: format!("{element:?}"),
        }
    }

    /// Creates an unknown-relation-table error.
    pub fn unknown_relation_table(table: impl Into<String>) -> Self {
        Self::UnknownRelationTable {
            table: table.into(),
        }
    }

    /// Creates a row-shape error.
    pub fn row_shape(table: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::RowShape {
            table: table.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an orphan-row error.
    pub fn orphan_row(table: impl Into<String>) -> Self {
        Self::OrphanRow {
            table: table.into(),
        }
    }
}

impl From<ValueError> for CoreError {
    fn from(err: ValueError) -> Self {
        Self::RowShape {
            table: "<unknown>".to_owned(),
            reason: err.to_string(),
        }
    }
}
