//! Unordered list container (duplicates allowed, value-identified).

use crate::error::{CoreError, CoreResult};
use crate::relation::Relation;
use crate::status::Status;

/// A change-tracking list.
///
/// Duplicates are allowed and elements are identified by value. Removing a
/// `Saved` element records one pending-deletion copy; removing a `New`
/// element leaves no trace. Re-adding a value that matches a pending
/// deletion cancels the deletion and the element re-enters as `Saved`.
///
/// Elements should be immutable value types; mutating an element in place
/// through external means is outside the container's contract.
#[derive(Debug, Clone)]
pub struct RelationList<T> {
    entries: Vec<(T, Status)>,
    pending: Vec<T>,
}

impl<T> Default for RelationList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl<T: Clone + PartialEq> RelationList<T> {
    /// Creates an empty list.
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

    /// Returns the element at `index`, untracked.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(value, _)| value)
    }

    /// Returns the status of the element at `index`.
    #[must_use]
    pub fn status(&self, index: usize) -> Option<Status> {
        self.entries.get(index).map(|(_, status)| *status)
    }

    /// Returns `true` if a live element equals `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.entries.iter().any(|(v, _)| v == value)
    }

    /// Iterates the live elements in order, untracked.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(value, _)| value)
    }

    /// Appends `value`.
    ///
    /// Enters as `Saved` if it exactly matches a pending deletion
    /// (consuming one pending copy), otherwise as `New`.
    pub fn push(&mut self, value: T) {
        let status = self.take_pending(&value);
        self.entries.push((value, status));
    }

    /// Inserts `value` at `index`, with the same status rules as `push`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> CoreResult<()> {
        if index > self.entries.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let status = self.take_pending(&value);
        self.entries.insert(index, (value, status));
        Ok(())
    }

    /// Removes the first live element equal to `value`.
    ///
    /// A `Saved` element is recorded as a pending deletion; a `New`
    /// element vanishes. Returns `false` if no element matched.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.entries.iter().position(|(v, _)| v == value) {
            Some(index) => {
                self.remove_entry(index);
                true
            }
            None => false,
        }
    }

    /// Removes the element at `index`, returning it.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> CoreResult<T> {
        if index >= self.entries.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.remove_entry(index))
    }

    /// Removes every live element, recording pending deletions for the
    /// `Saved` ones.
    pub fn clear(&mut self) {
        for (value, status) in self.entries.drain(..) {
            if status == Status::Saved {
                self.pending.push(value);
            }
        }
    }

    fn remove_entry(&mut self, index: usize) -> T {
        let (value, status) = self.entries.remove(index);
        if status == Status::Saved {
            self.pending.push(value.clone());
        }
        value
    }

    // Consumes one matching pending-deletion copy, yielding the re-entry
    // status.
    fn take_pending(&mut self, value: &T) -> Status {
        match self.pending.iter().position(|p| p == value) {
            Some(pos) => {
                self.pending.remove(pos);
                Status::Saved
            }
            None => Status::New,
        }
    }
}

impl<T: Clone + PartialEq> Relation for RelationList<T> {
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
        for (_, status) in &mut self.entries {
            *status = Status::Saved;
        }
    }

    fn repopulate(&mut self, elem: T) -> CoreResult<()> {
        if !self.is_clean() {
            return Err(CoreError::DirtyRepopulate);
        }
        self.entries.push((elem, Status::Saved));
        Ok(())
    }

    fn unsaved_entries(&self) -> usize {
        self.pending.len()
            + self
                .entries
                .iter()
                .filter(|(_, status)| status.is_unsaved())
                .count()
    }
}

impl<T: Clone + PartialEq> FromIterator<T> for RelationList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            list.push(value);
        }
        list
    }
}
