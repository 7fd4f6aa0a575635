//! Command planning: batching rows per (table, command kind).

use relstore_backend::Operation;
use relstore_model::{Row, TableSchema};
use std::collections::BTreeMap;

/// Accumulates rows per table and command kind, then emits one batched
/// [`Operation`] per populated (table, kind) pair.
///
/// Emission order: tables follow the order the caller computed; within a
/// table, Delete before Update before Insert, so a delete-then-reinsert
/// of the same element never collides with its own replacement.
#[derive(Debug, Default)]
pub(crate) struct Plan {
    schemas: BTreeMap<String, TableSchema>,
    inserts: BTreeMap<String, Vec<Row>>,
    updates: BTreeMap<String, Vec<Row>>,
    deletes: BTreeMap<String, (usize, Vec<Row>)>,
}

impl Plan {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues one inserted row.
    pub(crate) fn insert_row(&mut self, table: &TableSchema, row: Row) {
        self.remember(table);
        self.inserts.entry(table.name.clone()).or_default().push(row);
    }

    /// Queues one full replacement row.
    pub(crate) fn update_row(&mut self, table: &TableSchema, row: Row) {
        self.remember(table);
        self.updates.entry(table.name.clone()).or_default().push(row);
    }

    /// Queues one delete key of `key_width` leading columns.
    ///
    /// Every delete queued for one table in one plan must use the same
    /// width (element deletes and bulk owner deletes never mix within a
    /// single operation).
    pub(crate) fn delete_key(&mut self, table: &TableSchema, key_width: usize, key: Row) {
        self.remember(table);
        let (width, keys) = self
            .deletes
            .entry(table.name.clone())
            .or_insert_with(|| (key_width, Vec::new()));
        debug_assert_eq!(*width, key_width, "mixed delete widths for one table");
        keys.push(key);
    }

    /// Returns `true` if no rows were queued.
    pub(crate) fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Emits batched commands following `table_order`.
    ///
    /// Tables absent from the plan are skipped; a table in the plan but
    /// absent from `table_order` cannot happen when both were derived from
    /// the same registry.
    pub(crate) fn into_commands(mut self, table_order: &[String]) -> Vec<(TableSchema, Operation)> {
        let mut commands = Vec::new();
        for name in table_order {
            let Some(schema) = self.schemas.get(name) else {
                continue;
            };
            let schema = schema.clone();
            if let Some((key_width, keys)) = self.deletes.remove(name) {
                commands.push((schema.clone(), Operation::Delete { key_width, keys }));
            }
            if let Some(rows) = self.updates.remove(name) {
                commands.push((schema.clone(), Operation::Update { rows }));
            }
            if let Some(rows) = self.inserts.remove(name) {
                commands.push((schema, Operation::Insert { rows }));
            }
        }
        commands
    }

    fn remember(&mut self, table: &TableSchema) {
        if !self.schemas.contains_key(&table.name) {
            self.schemas.insert(table.name.clone(), table.clone());
        }
    }
}
