//! The translator contract: how an entity type maps to tables and rows.
//!
//! A real application implements [`Persist`] once per entity type (by hand
//! or through codegen); the orchestrator only ever sees the object-safe
//! [`Record`] view, so batches can mix entity types.

use crate::error::CoreResult;
use crate::status::Status;
use relstore_model::{Row, TableSchema};
use std::any::Any;

/// Which container kind a relation table stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// [`RelationList`](crate::RelationList): duplicates, value identity.
    List,
    /// [`RelationSet`](crate::RelationSet): unique values.
    Set,
    /// [`RelationMap`](crate::RelationMap): unique keys.
    Map,
    /// [`RelationOrderedList`](crate::RelationOrderedList): positional
    /// identity.
    Ordered,
}

/// One relation table owned by an entity type.
///
/// The table's columns are the owner-key columns, then the element key or
/// position for `Map`/`Ordered` kinds, then the value columns; its
/// `key_width` covers the owner key plus the element key/position where
/// one exists.
#[derive(Debug, Clone)]
pub struct RelationTable {
    /// The relation table schema.
    pub schema: TableSchema,
    /// The container kind stored in the table.
    pub kind: RelationKind,
}

impl RelationTable {
    /// Creates a relation table descriptor.
    #[must_use]
    pub fn new(schema: TableSchema, kind: RelationKind) -> Self {
        Self { schema, kind }
    }
}

/// The full table layout of one entity type: a principal table plus one
/// relation table per container property.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    /// Stable name of the entity type (used for depot dispatch).
    pub type_name: &'static str,
    /// The principal table (scalar, foreign-key, and enum-as-string
    /// columns).
    pub principal: TableSchema,
    /// Relation tables in declaration order.
    pub relations: Vec<RelationTable>,
}

impl EntitySchema {
    /// Creates an entity schema.
    #[must_use]
    pub fn new(
        type_name: &'static str,
        principal: TableSchema,
        relations: Vec<RelationTable>,
    ) -> Self {
        Self {
            type_name,
            principal,
            relations,
        }
    }

    /// Looks up one of this entity's relation tables by name.
    #[must_use]
    pub fn relation(&self, table: &str) -> Option<&RelationTable> {
        self.relations.iter().find(|r| r.schema.name == table)
    }

    /// Iterates every table of this entity, principal first.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        std::iter::once(&self.principal).chain(self.relations.iter().map(|r| &r.schema))
    }
}

/// Maps an entity type to its tables and rows.
///
/// Implementations decompose an instance into one principal row plus, per
/// relation table, suffix rows (element key/position and value columns,
/// *without* the owner-key prefix - the orchestrator prepends that), and
/// reconstruct instances from stored rows.
pub trait Persist: Sized + 'static {
    /// Returns the table layout of this entity type.
    fn schema() -> EntitySchema;

    /// Reconstructs an instance from a principal row.
    ///
    /// Relation containers start empty and clean; the orchestrator fills
    /// them through [`Record::repopulate_relation`].
    fn from_row(row: &Row) -> CoreResult<Self>;

    /// Returns the primary-key values of this instance.
    fn key(&self) -> Row;

    /// Returns the full principal row, key columns leading.
    fn principal_row(&self) -> Row;

    /// Returns the diff of the named relation table as suffix rows.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRelationTable` for a table this entity does not
    /// own.
    fn relation_diff(&self, table: &str) -> CoreResult<Vec<(Row, Status)>>;

    /// Feeds one stored suffix row back into the named relation container
    /// via its `repopulate` path.
    fn repopulate_relation(&mut self, table: &str, row: &Row) -> CoreResult<()>;

    /// Canonicalizes every relation container of this instance.
    fn canonicalize_relations(&mut self);

    /// Sums `unsaved_entries` across this instance's relation containers.
    fn unsaved_relation_entries(&self) -> usize;
}

/// Object-safe runtime view of a persistable entity.
///
/// Blanket-implemented for every [`Persist`] type; the orchestrator works
/// entirely in `&mut dyn Record` so one batch can span entity types.
pub trait Record: Any {
    /// Upcasts to `Any` for registry lookup and depot downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast to `Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Owned upcast to `Any`, for depots that recover concrete types.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Returns the Rust type name of the concrete entity (diagnostics).
    fn type_name(&self) -> &'static str;

    /// See [`Persist::key`].
    fn key(&self) -> Row;

    /// See [`Persist::principal_row`].
    fn principal_row(&self) -> Row;

    /// See [`Persist::relation_diff`].
    fn relation_diff(&self, table: &str) -> CoreResult<Vec<(Row, Status)>>;

    /// See [`Persist::repopulate_relation`].
    fn repopulate_relation(&mut self, table: &str, row: &Row) -> CoreResult<()>;

    /// See [`Persist::canonicalize_relations`].
    fn canonicalize_relations(&mut self);

    /// See [`Persist::unsaved_relation_entries`].
    fn unsaved_relation_entries(&self) -> usize;
}

impl<E: Persist> Record for E {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<E>()
    }

    fn key(&self) -> Row {
        Persist::key(self)
    }

    fn principal_row(&self) -> Row {
        Persist::principal_row(self)
    }

    fn relation_diff(&self, table: &str) -> CoreResult<Vec<(Row, Status)>> {
        Persist::relation_diff(self, table)
    }

    fn repopulate_relation(&mut self, table: &str, row: &Row) -> CoreResult<()> {
        Persist::repopulate_relation(self, table, row)
    }

    fn canonicalize_relations(&mut self) {
        Persist::canonicalize_relations(self);
    }

    fn unsaved_relation_entries(&self) -> usize {
        Persist::unsaved_relation_entries(self)
    }
}
