//! In-memory backend for testing.

use crate::backend::{Backend, Operation};
use crate::error::{BackendError, BackendResult};
use relstore_model::{Row, TableSchema};
use std::collections::HashMap;

/// An in-memory relational backend.
///
/// Tables are plain row vectors; a transaction snapshots the whole store
/// at `begin` and restores it on `rollback`. Suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// Constraint enforcement is intentionally minimal (table existence only);
/// the orchestrator is responsible for emitting well-formed commands.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: HashMap<String, Vec<Row>>,
    snapshot: Option<HashMap<String, Vec<Row>>>,
}

impl MemoryBackend {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a transaction is open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Returns the number of rows currently stored in `table`.
    ///
    /// Useful for assertions; returns 0 for unknown tables.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    /// Returns `true` if `table` exists.
    #[must_use]
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    fn rows_mut(&mut self, table: &TableSchema) -> BackendResult<&mut Vec<Row>> {
        self.tables
            .get_mut(&table.name)
            .ok_or_else(|| BackendError::unknown_table(&table.name))
    }
}

impl Backend for MemoryBackend {
    fn begin(&mut self) -> BackendResult<()> {
        if self.snapshot.is_some() {
            return Err(BackendError::NestedTransaction);
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> BackendResult<()> {
        if self.snapshot.take().is_none() {
            return Err(BackendError::NoTransaction);
        }
        Ok(())
    }

    fn rollback(&mut self) -> BackendResult<()> {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.tables = snapshot;
                Ok(())
            }
            None => Err(BackendError::NoTransaction),
        }
    }

    fn execute(&mut self, table: &TableSchema, op: &Operation) -> BackendResult<()> {
        if self.snapshot.is_none() {
            return Err(BackendError::NoTransaction);
        }
        match op {
            Operation::CreateTable => {
                if self.tables.contains_key(&table.name) {
                    return Err(BackendError::table_exists(&table.name));
                }
                self.tables.insert(table.name.clone(), Vec::new());
                Ok(())
            }
            Operation::Insert { rows } => {
                self.rows_mut(table)?.extend(rows.iter().cloned());
                Ok(())
            }
            Operation::Update { rows } => {
                let key_width = table.key_width;
                let stored = self.rows_mut(table)?;
                for row in rows {
                    let key = row.prefix(key_width);
                    for stored_row in stored.iter_mut() {
                        if stored_row.starts_with(&key) {
                            *stored_row = row.clone();
                        }
                    }
                }
                Ok(())
            }
            Operation::Delete { key_width, keys } => {
                let width = *key_width;
                let stored = self.rows_mut(table)?;
                stored.retain(|row| {
                    !keys
                        .iter()
                        .any(|key| row.prefix(width).starts_with(&key.prefix(width)))
                });
                Ok(())
            }
        }
    }

    fn select_all(&mut self, table: &TableSchema) -> BackendResult<Vec<Row>> {
        self.tables
            .get(&table.name)
            .cloned()
            .ok_or_else(|| BackendError::unknown_table(&table.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relstore_model::{row, ColumnSchema, ValueType};

    fn people() -> TableSchema {
        TableSchema::new(
            "people",
            vec![
                ColumnSchema::new("id", ValueType::Integer),
                ColumnSchema::new("name", ValueType::Text),
            ],
            1,
        )
    }

    fn tags() -> TableSchema {
        // Relation-table shape: owner key + position + value.
        TableSchema::new(
            "tags",
            vec![
                ColumnSchema::new("owner_id", ValueType::Integer),
                ColumnSchema::new("position", ValueType::Integer),
                ColumnSchema::new("tag", ValueType::Text),
            ],
            2,
        )
    }

    fn backend_with(table: &TableSchema, rows: Vec<Row>) -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        backend.begin().unwrap();
        backend.execute(table, &Operation::CreateTable).unwrap();
        backend.execute(table, &Operation::Insert { rows }).unwrap();
        backend.commit().unwrap();
        backend
    }

    #[test]
    fn create_insert_select_round_trip() {
        let table = people();
        let mut backend = backend_with(&table, vec![row![1i64, "ada"], row![2i64, "bob"]]);
        let rows = backend.select_all(&table).unwrap();
        assert_eq!(rows, vec![row![1i64, "ada"], row![2i64, "bob"]]);
    }

    #[test]
    fn execute_outside_transaction_fails() {
        let table = people();
        let mut backend = MemoryBackend::new();
        let result = backend.execute(&table, &Operation::CreateTable);
        assert_eq!(result, Err(BackendError::NoTransaction));
    }

    #[test]
    fn nested_begin_fails() {
        let mut backend = MemoryBackend::new();
        backend.begin().unwrap();
        assert_eq!(backend.begin(), Err(BackendError::NestedTransaction));
    }

    #[test]
    fn commit_without_begin_fails() {
        let mut backend = MemoryBackend::new();
        assert_eq!(backend.commit(), Err(BackendError::NoTransaction));
        assert_eq!(backend.rollback(), Err(BackendError::NoTransaction));
    }

    #[test]
    fn create_duplicate_table_fails() {
        let table = people();
        let mut backend = MemoryBackend::new();
        backend.begin().unwrap();
        backend.execute(&table, &Operation::CreateTable).unwrap();
        let result = backend.execute(&table, &Operation::CreateTable);
        assert!(matches!(result, Err(BackendError::TableExists { .. })));
    }

    #[test]
    fn rollback_restores_pre_begin_state() {
        let table = people();
        let mut backend = backend_with(&table, vec![row![1i64, "ada"]]);

        backend.begin().unwrap();
        backend
            .execute(
                &table,
                &Operation::Insert {
                    rows: vec![row![2i64, "bob"]],
                },
            )
            .unwrap();
        backend.rollback().unwrap();

        assert_eq!(backend.select_all(&table).unwrap(), vec![row![1i64, "ada"]]);
    }

    #[test]
    fn update_matches_on_key_prefix() {
        let table = people();
        let mut backend = backend_with(&table, vec![row![1i64, "ada"], row![2i64, "bob"]]);

        backend.begin().unwrap();
        backend
            .execute(
                &table,
                &Operation::Update {
                    rows: vec![row![2i64, "robert"]],
                },
            )
            .unwrap();
        backend.commit().unwrap();

        assert_eq!(
            backend.select_all(&table).unwrap(),
            vec![row![1i64, "ada"], row![2i64, "robert"]]
        );
    }

    #[test]
    fn delete_by_full_key() {
        let table = tags();
        let mut backend = backend_with(
            &table,
            vec![row![1i64, 0i64, "red"], row![1i64, 1i64, "blue"]],
        );

        backend.begin().unwrap();
        backend
            .execute(
                &table,
                &Operation::Delete {
                    key_width: 2,
                    keys: vec![row![1i64, 1i64]],
                },
            )
            .unwrap();
        backend.commit().unwrap();

        assert_eq!(
            backend.select_all(&table).unwrap(),
            vec![row![1i64, 0i64, "red"]]
        );
    }

    #[test]
    fn delete_by_owner_prefix_removes_all_rows() {
        let table = tags();
        let mut backend = backend_with(
            &table,
            vec![
                row![1i64, 0i64, "red"],
                row![1i64, 1i64, "blue"],
                row![2i64, 0i64, "green"],
            ],
        );

        backend.begin().unwrap();
        backend
            .execute(
                &table,
                &Operation::Delete {
                    key_width: 1,
                    keys: vec![row![1i64]],
                },
            )
            .unwrap();
        backend.commit().unwrap();

        assert_eq!(
            backend.select_all(&table).unwrap(),
            vec![row![2i64, 0i64, "green"]]
        );
    }

    #[test]
    fn select_unknown_table_fails() {
        let mut backend = MemoryBackend::new();
        let result = backend.select_all(&people());
        assert!(matches!(result, Err(BackendError::UnknownTable { .. })));
    }
}
