//! Transaction orchestrator.

mod order;
mod plan;

use crate::depot::Depot;
use crate::error::{CoreError, CoreResult};
use crate::persist::Persist;
use crate::persist::Record;
use crate::persist::RelationKind;
use crate::registry::{Registration, Registry};
use crate::status::Status;
use order::{table_order, OrderDirection};
use plan::Plan;
use relstore_backend::{Backend, BackendError, Operation};
use relstore_model::TableSchema;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Orchestrates batched, ordered, all-or-nothing writes of entity batches.
///
/// A `Transactor` owns one backend connection and a [`Registry`] of entity
/// types. Each public operation is one transaction: the batch is
/// decomposed into principal and relation rows, rows are batched into one
/// command per (table, command kind), commands are ordered along the
/// foreign-key dependency graph, and everything executes between one
/// `begin` and one `commit`. On any failure the transaction is rolled
/// back exactly once and the original failure is surfaced; relation
/// containers are canonicalized only after a confirmed commit.
///
/// Execution is single-threaded and synchronous; retry policy belongs to
/// the caller.
pub struct Transactor<B: Backend> {
    backend: B,
    registry: Registry,
}

impl<B: Backend> Transactor<B> {
    /// Creates a transactor owning `backend` with an empty registry.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registry: Registry::new(),
        }
    }

    /// Registers an entity type.
    pub fn register<E: Persist>(&mut self) {
        self.registry.register::<E>();
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the transactor, returning the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Creates every registered table, referenced tables first.
    ///
    /// # Errors
    ///
    /// Rolls back and returns the original failure if any create command
    /// or the commit fails.
    pub fn create_tables(&mut self) -> CoreResult<()> {
        let order = self.construct_order()?;
        let schemas = self.schemas_by_name();
        let commands: Vec<(TableSchema, Operation)> = order
            .iter()
            .filter_map(|name| schemas.get(name.as_str()))
            .map(|&schema| (schema.clone(), Operation::CreateTable))
            .collect();
        self.run("create_tables", commands)
    }

    /// Inserts a batch of entities.
    ///
    /// Every live relation element with status `New` goes out as an
    /// inserted row prefixed by its owner's key; a freshly built container
    /// is all `New`, so a plain insert sends everything live the first
    /// time. An empty batch opens no transaction. After commit, every
    /// relation container in the batch is canonicalized.
    ///
    /// # Errors
    ///
    /// Fails on unregistered types, and rolls back on any backend
    /// failure.
    pub fn insert(&mut self, batch: &mut [&mut dyn Record]) -> CoreResult<()> {
        let mut plan = Plan::new();
        for record in batch.iter() {
            let registration = self.registry.for_record(&**record)?;
            let schema = registration.schema();
            let key = record.key();
            plan.insert_row(&schema.principal, record.principal_row());
            for relation in &schema.relations {
                for (suffix, status) in record.relation_diff(&relation.schema.name)? {
                    if status == Status::New {
                        plan.insert_row(&relation.schema, key.joined(&suffix));
                    }
                }
            }
        }
        if plan.is_empty() {
            return Ok(());
        }
        let commands = plan.into_commands(&self.construct_order()?);
        self.run("insert", commands)?;
        for record in batch.iter_mut() {
            record.canonicalize_relations();
        }
        Ok(())
    }

    /// Updates a batch of entities.
    ///
    /// Each principal row is re-sent as an update; each relation diff is
    /// partitioned into insert (`New`), delete (`Deleted`, addressed by
    /// owner key plus element key/position only), and update (`Modified`,
    /// ordered kind only) rows. `Saved` elements are not re-sent, with one
    /// exception: a list delete key is the full row value and sweeps every
    /// stored duplicate, so `Saved` duplicates of a deleted list value are
    /// re-inserted and repeated delete keys collapse to one. An empty
    /// batch opens no transaction. After commit, every relation container
    /// in the batch is canonicalized.
    ///
    /// # Errors
    ///
    /// Fails on unregistered types, and rolls back on any backend
    /// failure.
    pub fn update(&mut self, batch: &mut [&mut dyn Record]) -> CoreResult<()> {
        let mut plan = Plan::new();
        for record in batch.iter() {
            let registration = self.registry.for_record(&**record)?;
            let schema = registration.schema();
            let key = record.key();
            plan.update_row(&schema.principal, record.principal_row());
            for relation in &schema.relations {
                let table = &relation.schema;
                // Deletions lead the diff, so every doomed list value is
                // known before its surviving copies come past.
                let mut doomed = HashSet::new();
                for (suffix, status) in record.relation_diff(&table.name)? {
                    let full = key.joined(&suffix);
                    match status {
                        Status::New => plan.insert_row(table, full),
                        Status::Deleted => {
                            let delete_key = full.prefix(table.key_width);
                            if relation.kind != RelationKind::List
                                || doomed.insert(delete_key.clone())
                            {
                                plan.delete_key(table, table.key_width, delete_key);
                            }
                        }
                        Status::Modified => plan.update_row(table, full),
                        Status::Saved => {
                            if relation.kind == RelationKind::List
                                && doomed.contains(&full.prefix(table.key_width))
                            {
                                plan.insert_row(table, full);
                            }
                        }
                    }
                }
            }
        }
        if plan.is_empty() {
            return Ok(());
        }
        let commands = plan.into_commands(&self.construct_order()?);
        self.run("update", commands)?;
        for record in batch.iter_mut() {
            record.canonicalize_relations();
        }
        Ok(())
    }

    /// Deletes a batch of entities.
    ///
    /// Emits one principal key row per entity plus one bulk owner-key
    /// delete row per relation table - even when the container tracks
    /// zero elements. An empty batch opens no transaction. Table order
    /// derives from each foreign key's declared delete behavior, so
    /// relation tables (blocking keys) clear before their principals.
    ///
    /// # Errors
    ///
    /// Fails on unregistered types, and rolls back on any backend
    /// failure.
    pub fn delete(&mut self, batch: &[&dyn Record]) -> CoreResult<()> {
        let mut plan = Plan::new();
        for record in batch {
            let registration = self.registry.for_record(*record)?;
            let schema = registration.schema();
            let key = record.key();
            let owner_width = schema.principal.key_width;
            for relation in &schema.relations {
                plan.delete_key(&relation.schema, owner_width, key.clone());
            }
            plan.delete_key(&schema.principal, owner_width, key);
        }
        if plan.is_empty() {
            return Ok(());
        }
        let order = table_order(
            self.registry.iter().map(Registration::schema),
            OrderDirection::Demolish,
        )?;
        let commands = plan.into_commands(&order);
        self.run("delete", commands)
    }

    /// Loads every stored entity into `depot`.
    ///
    /// Tables are read in referenced-before-referencer order: principal
    /// rows are reconstructed through each type's registered factory,
    /// then relation rows are matched to their owner by owner-key prefix
    /// and fed through the container's `repopulate` path, so every loaded
    /// entity starts with zero unsaved entries.
    ///
    /// # Errors
    ///
    /// Fails on malformed rows, relation rows without a loaded owner, or
    /// backend failures.
    pub fn select_all(&mut self, depot: &mut dyn Depot) -> CoreResult<()> {
        let order = self.construct_order()?;

        // table name -> (registration index, relation index)
        let mut locate: HashMap<String, (usize, Option<usize>)> = HashMap::new();
        for (entity_index, registration) in self.registry.iter().enumerate() {
            let schema = registration.schema();
            locate.insert(schema.principal.name.clone(), (entity_index, None));
            for (relation_index, relation) in schema.relations.iter().enumerate() {
                locate.insert(
                    relation.schema.name.clone(),
                    (entity_index, Some(relation_index)),
                );
            }
        }

        let mut loaded: Vec<LoadedType> = (0..self.registry.len())
            .map(|_| LoadedType::default())
            .collect();

        for name in &order {
            let Some(&(entity_index, relation_index)) = locate.get(name) else {
                continue;
            };
            let Some(registration) = self.registry.get(entity_index) else {
                continue;
            };
            match relation_index {
                None => {
                    let principal = registration.schema().principal.clone();
                    let rows = self.backend.select_all(&principal)?;
                    debug!(table = %principal.name, rows = rows.len(), "loading principal rows");
                    let slot = &mut loaded[entity_index];
                    for row in rows {
                        let record = registration.from_row(&row)?;
                        let key = principal.key_of(&row);
                        slot.index.insert(key, slot.records.len());
                        slot.records.push(record);
                    }
                }
                Some(relation_index) => {
                    let schema = registration.schema();
                    let owner_width = schema.principal.key_width;
                    let table = schema.relations[relation_index].schema.clone();
                    let mut rows = self.backend.select_all(&table)?;
                    // Key-prefix order, so ordered-list positions
                    // repopulate in sequence.
                    rows.sort();
                    let slot = &mut loaded[entity_index];
                    for row in rows {
                        let owner = row.prefix(owner_width);
                        let Some(&record_index) = slot.index.get(&owner) else {
                            return Err(CoreError::orphan_row(&table.name));
                        };
                        slot.records[record_index]
                            .repopulate_relation(&table.name, &row.suffix(owner_width))?;
                    }
                }
            }
        }

        for (entity_index, slot) in loaded.into_iter().enumerate() {
            let Some(registration) = self.registry.get(entity_index) else {
                continue;
            };
            let type_name = registration.schema().type_name;
            for record in slot.records {
                depot.store(type_name, record);
            }
        }
        Ok(())
    }

    /// Runs a command list as one transaction with at most one rollback.
    fn run(&mut self, operation: &'static str, commands: Vec<(TableSchema, Operation)>) -> CoreResult<()> {
        debug!(operation, commands = commands.len(), "executing transaction");
        self.backend.begin()?;
        for (table, op) in &commands {
            if let Err(err) = self.backend.execute(table, op) {
                return Err(self.fail(operation, err));
            }
        }
        if let Err(err) = self.backend.commit() {
            return Err(self.fail(operation, err));
        }
        Ok(())
    }

    /// Attempts exactly one rollback, surfacing both failures if it also
    /// fails.
    fn fail(&mut self, operation: &'static str, cause: BackendError) -> CoreError {
        match self.backend.rollback() {
            Ok(()) => CoreError::TransactionFailed {
                operation,
                source: cause,
            },
            Err(rollback) => CoreError::RollbackFailed {
                operation,
                commit: cause,
                rollback,
            },
        }
    }

    fn construct_order(&self) -> CoreResult<Vec<String>> {
        table_order(
            self.registry.iter().map(Registration::schema),
            OrderDirection::Construct,
        )
    }

    fn schemas_by_name(&self) -> HashMap<&str, &TableSchema> {
        let mut schemas = HashMap::new();
        for registration in self.registry.iter() {
            for table in registration.schema().tables() {
                schemas.insert(table.name.as_str(), table);
            }
        }
        schemas
    }
}

impl<B: Backend + std::fmt::Debug> std::fmt::Debug for Transactor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transactor")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct LoadedType {
    records: Vec<Box<dyn Record>>,
    index: HashMap<relstore_model::Row, usize>,
}
