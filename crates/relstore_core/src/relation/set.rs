//! Set container (unique values).

use crate::error::{CoreError, CoreResult};
use crate::relation::Relation;
use crate::status::Status;
use std::collections::{BTreeMap, BTreeSet};

/// A change-tracking set.
///
/// Same tri-state rules as [`RelationList`], with uniqueness enforced:
/// inserting a value that is already live is a no-op returning `false`,
/// mirroring standard set semantics. BTree backing keeps the diff order
/// repeatable.
///
/// [`RelationList`]: crate::relation::RelationList
#[derive(Debug, Clone)]
pub struct RelationSet<T> {
    entries: BTreeMap<T, Status>,
    pending: BTreeSet<T>,
}

impl<T> Default for RelationSet<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            pending: BTreeSet::new(),
        }
    }
}

impl<T: Clone + Ord> RelationSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no live elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `value` is live.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.entries.contains_key(value)
    }

    /// Returns the status of a live element.
    #[must_use]
    pub fn status(&self, value: &T) -> Option<Status> {
        self.entries.get(value).copied()
    }

    /// Iterates the live elements in ascending order, untracked.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.keys()
    }

    /// Inserts `value`.
    ///
    /// Returns `false` if the value is already live. Otherwise the value
    /// enters as `Saved` if it matches a pending deletion (cancelling it),
    /// else as `New`.
    pub fn insert(&mut self, value: T) -> bool {
        if self.entries.contains_key(&value) {
            return false;
        }
        let status = if self.pending.remove(&value) {
            Status::Saved
        } else {
            Status::New
        };
        self.entries.insert(value, status);
        true
    }

    /// Removes `value`.
    ///
    /// A `Saved` element is recorded as a pending deletion; a `New`
    /// element vanishes. Returns `false` if the value was not live.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.entries.remove(value) {
            Some(Status::Saved) => {
                self.pending.insert(value.clone());
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Removes every live element, recording pending deletions for the
    /// `Saved` ones.
    pub fn clear(&mut self) {
        let drained = std::mem::take(&mut self.entries);
        for (value, status) in drained {
            if status == Status::Saved {
                self.pending.insert(value);
            }
        }
    }
}

impl<T: Clone + Ord> Relation for RelationSet<T> {
    type Elem = T;

    fn diff(&self) -> Vec<(T, Status)> {
        let mut out = Vec::with_capacity(self.pending.len() + self.entries.len());
        for value in &self.pending {
            out.push((value.clone(), Status::Deleted));
        }
        for (value, status) in &self.entries {
            out.push((value.clone(), *status));
        }
        out
    }

    fn canonicalize(&mut self) {
        self.pending.clear();
        for status in self.entries.values_mut() {
            *status = Status::Saved;
        }
    }

    fn repopulate(&mut self, elem: T) -> CoreResult<()> {
        if !self.is_clean() {
            return Err(CoreError::DirtyRepopulate);
        }
        if self.entries.contains_key(&elem) {
            return Err(CoreError::DuplicateElement {
                element: "set element already present".to_owned(),
            });
        }
        self.entries.insert(elem, Status::Saved);
        Ok(())
    }

    fn unsaved_entries(&self) -> usize {
        self.pending.len()
            + self
                .entries
                .values()
                .filter(|status| status.is_unsaved())
                .count()
    }
}

impl<T: Clone + Ord> FromIterator<T> for RelationSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}
