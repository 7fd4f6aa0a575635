//! Backend trait definition.

use crate::error::BackendResult;
use relstore_model::{Row, TableSchema};

/// One batched table command.
///
/// An `Operation` always addresses a single table and carries every row
/// destined for that table in one call - the orchestrator batches rows per
/// (table, command kind), so a backend sees exactly one `execute` per
/// touched table per command kind per top-level call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Creates the table.
    CreateTable,
    /// Inserts the given full rows.
    Insert {
        /// Full rows in the table's column order.
        rows: Vec<Row>,
    },
    /// Updates stored rows in place.
    ///
    /// Each row is a full row; stored rows are matched on the table's
    /// `key_width` leading columns and their remaining columns replaced.
    Update {
        /// Full replacement rows.
        rows: Vec<Row>,
    },
    /// Deletes stored rows by key prefix.
    ///
    /// Each key row carries the first `key_width` columns; every stored
    /// row whose leading values match any key row is removed. With
    /// `key_width` equal to an owner-key width this is a bulk
    /// "all rows of this owner" delete; with the full key width it deletes
    /// individual elements.
    Delete {
        /// Number of leading columns each key row carries.
        key_width: usize,
        /// Key-prefix rows to match.
        keys: Vec<Row>,
    },
}

impl Operation {
    /// Returns the number of rows this operation carries.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::CreateTable => 0,
            Self::Insert { rows } | Self::Update { rows } => rows.len(),
            Self::Delete { keys, .. } => keys.len(),
        }
    }
}

/// A relational backend for RelStore.
///
/// Backends are **command executors**. They own the connection, run one
/// transaction at a time, and apply batched table commands. They do not
/// understand entities, change tracking, or ordering - the orchestrator
/// owns all of that.
///
/// # Invariants
///
/// - At most one transaction is open at a time; `begin` inside an open
///   transaction is an error.
/// - Mutating `execute` calls require an open transaction; `select_all`
///   does not.
/// - After `rollback`, the backend's visible state is exactly what it was
///   before the matching `begin`.
/// - `select_all` returns rows in a stable order for an unchanged table.
///
/// # Implementors
///
/// - [`crate::MemoryBackend`] - for tests and ephemeral stores.
pub trait Backend {
    /// Begins a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction is already open or the driver
    /// fails.
    fn begin(&mut self) -> BackendResult<()>;

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open or the commit fails; on
    /// failure the transaction is still open and must be rolled back.
    fn commit(&mut self) -> BackendResult<()>;

    /// Rolls back the open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open or the rollback itself
    /// fails.
    fn rollback(&mut self) -> BackendResult<()>;

    /// Executes one batched command against `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open, the table is unknown
    /// (or, for `CreateTable`, already exists), or the driver fails.
    fn execute(&mut self, table: &TableSchema, op: &Operation) -> BackendResult<()>;

    /// Returns every row of `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is unknown or the driver fails.
    fn select_all(&mut self, table: &TableSchema) -> BackendResult<Vec<Row>>;
}
