//! Registry of persistable entity types.

use crate::error::{CoreError, CoreResult};
use crate::persist::{EntitySchema, Persist, Record};
use relstore_model::Row;
use std::any::TypeId;
use std::collections::HashMap;

type Factory = Box<dyn Fn(&Row) -> CoreResult<Box<dyn Record>> + Send + Sync>;

/// One registered entity type: its schema plus an erased row factory.
pub struct Registration {
    schema: EntitySchema,
    factory: Factory,
}

impl Registration {
    /// Returns the entity schema.
    #[must_use]
    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    /// Reconstructs an instance from a principal row.
    pub fn from_row(&self, row: &Row) -> CoreResult<Box<dyn Record>> {
        (self.factory)(row)
    }
}

/// Holds every entity type the orchestrator knows about.
///
/// Registration order is preserved and used as the tie-break when
/// topologically ordering tables, keeping command order deterministic.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Registration>,
    by_type: HashMap<TypeId, usize>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity type.
    ///
    /// Re-registering the same type replaces its schema in place.
    pub fn register<E: Persist>(&mut self) {
        let registration = Registration {
            schema: E::schema(),
            factory: Box::new(|row| Ok(Box::new(E::from_row(row)?) as Box<dyn Record>)),
        };
        match self.by_type.get(&TypeId::of::<E>()) {
            Some(&index) => self.entries[index] = registration,
            None => {
                self.by_type.insert(TypeId::of::<E>(), self.entries.len());
                self.entries.push(registration);
            }
        }
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.entries.iter()
    }

    /// Returns the registration at `index` (registration order).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Registration> {
        self.entries.get(index)
    }

    /// Looks up the registration for a record instance.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredType` if the record's concrete type was never
    /// registered.
    pub fn for_record(&self, record: &dyn Record) -> CoreResult<&Registration> {
        let type_id = record.as_any().type_id();
        self.by_type
            .get(&type_id)
            .map(|&index| &self.entries[index])
            .ok_or(CoreError::UnregisteredType {
                type_name: record.type_name(),
            })
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "types",
                &self
                    .entries
                    .iter()
                    .map(|r| r.schema.type_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
