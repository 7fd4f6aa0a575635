//! A vector depot with typed extraction.

use relstore_core::{Depot, Persist, Record};
use std::collections::HashMap;

/// Collects records from `select_all`, grouped by registered type name,
/// preserving arrival order within each group.
#[derive(Default)]
pub struct VecDepot {
    groups: HashMap<&'static str, Vec<Box<dyn Record>>>,
}

impl VecDepot {
    /// Creates an empty depot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records stored under `type_name`.
    #[must_use]
    pub fn count(&self, type_name: &str) -> usize {
        self.groups.get(type_name).map_or(0, Vec::len)
    }

    /// Removes and downcasts every stored record of type `E`.
    ///
    /// Records whose registered type name matches `type_name` but whose
    /// concrete type is not `E` are dropped; fixtures register one type
    /// per name, so in practice nothing is lost.
    #[must_use]
    pub fn take<E: Persist>(&mut self, type_name: &str) -> Vec<E> {
        self.groups
            .remove(type_name)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| record.into_any().downcast::<E>().ok().map(|b| *b))
            .collect()
    }
}

impl Depot for VecDepot {
    fn store(&mut self, type_name: &'static str, record: Box<dyn Record>) {
        self.groups.entry(type_name).or_default().push(record);
    }
}

impl std::fmt::Debug for VecDepot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<_> = self.groups.iter().map(|(k, v)| (*k, v.len())).collect();
        counts.sort_unstable();
        f.debug_struct("VecDepot").field("counts", &counts).finish()
    }
}
