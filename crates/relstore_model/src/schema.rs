//! Minimal relational schema model.
//!
//! Just enough structure for the orchestrator to plan against: table and
//! column names, a prefix primary key, and foreign keys with a declared
//! delete behavior. Constraint checking and SQL rendering belong to real
//! backend drivers, not this crate.

use crate::row::Row;
use crate::value::ValueType;

/// What a foreign key does when its referenced row is deleted.
///
/// The orchestrator derives its delete ordering from this declaration:
/// `Restrict` is blocking (the referencing rows must go first), while
/// `Cascade` and `SetNull` are non-blocking (deletes mirror insert order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeleteBehavior {
    /// The referenced row cannot be deleted while referencing rows exist.
    Restrict,
    /// Deleting the referenced row deletes the referencing rows.
    Cascade,
    /// Deleting the referenced row nulls the referencing column.
    SetNull,
}

impl DeleteBehavior {
    /// Returns `true` if this behavior blocks deletion of the referenced
    /// row while referencing rows still exist.
    #[must_use]
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Restrict)
    }
}

/// A foreign key from one column to another table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Name of the referenced table.
    pub table: String,
    /// Delete behavior declared on this key.
    pub on_delete: DeleteBehavior,
}

impl ForeignKey {
    /// Creates a foreign key to `table` with the given delete behavior.
    pub fn new(table: impl Into<String>, on_delete: DeleteBehavior) -> Self {
        Self {
            table: table.into(),
            on_delete,
        }
    }
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Value type stored in the column.
    pub ty: ValueType,
    /// Whether the column admits nulls.
    pub nullable: bool,
    /// Foreign key constraint, if any.
    pub references: Option<ForeignKey>,
}

impl ColumnSchema {
    /// Creates a non-nullable column with no foreign key.
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            references: None,
        }
    }

    /// Marks the column nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attaches a foreign key to the column.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, on_delete: DeleteBehavior) -> Self {
        self.references = Some(ForeignKey::new(table, on_delete));
        self
    }
}

/// A table: named columns with a prefix primary key.
///
/// The first `key_width` columns form the primary key. Relation tables
/// follow the same convention with their owner-key columns leading, so a
/// bulk "all rows of this owner" delete is a key-prefix match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name (unique within a registry).
    pub name: String,
    /// Columns in storage order.
    pub columns: Vec<ColumnSchema>,
    /// Number of leading columns forming the primary key.
    pub key_width: usize,
}

impl TableSchema {
    /// Creates a table schema.
    ///
    /// # Panics
    ///
    /// Panics if `key_width` exceeds the column count or is zero; schemas
    /// are static declarations, so this is a programming error.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>, key_width: usize) -> Self {
        assert!(
            key_width >= 1 && key_width <= columns.len(),
            "key_width must cover at least one and at most all columns"
        );
        Self {
            name: name.into(),
            columns,
            key_width,
        }
    }

    /// Returns the primary-key prefix of `row`.
    #[must_use]
    pub fn key_of(&self, row: &Row) -> Row {
        row.prefix(self.key_width)
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Iterates the foreign keys declared on this table's columns.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.columns.iter().filter_map(|c| c.references.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn books() -> TableSchema {
        TableSchema::new(
            "books",
            vec![
                ColumnSchema::new("id", ValueType::Uuid),
                ColumnSchema::new("title", ValueType::Text),
                ColumnSchema::new("author_id", ValueType::Uuid)
                    .references("authors", DeleteBehavior::Cascade),
            ],
            1,
        )
    }

    #[test]
    fn key_of_takes_prefix() {
        let table = books();
        let row = row![1i64, "title", 2i64];
        assert_eq!(table.key_of(&row), row![1i64]);
    }

    #[test]
    fn column_lookup_by_name() {
        let table = books();
        assert_eq!(table.column("title").unwrap().ty, ValueType::Text);
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn foreign_keys_enumerated() {
        let table = books();
        let fks: Vec<_> = table.foreign_keys().collect();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].table, "authors");
        assert!(!fks[0].on_delete.is_blocking());
    }

    #[test]
    #[should_panic(expected = "key_width")]
    fn zero_key_width_rejected() {
        TableSchema::new("t", vec![ColumnSchema::new("a", ValueType::Integer)], 0);
    }
}
