//! Positionally-ordered list container (identity = index).

use crate::error::{CoreError, CoreResult};
use crate::relation::Relation;
use crate::status::Status;

/// A change-tracking list whose element identity is the positional index.
///
/// The container keeps the current sequence plus a snapshot of the
/// sequence as of the last canonicalization. The status of index `i`
/// falls out of comparing the two: `New` beyond the snapshot length,
/// `Saved` where the values match, `Modified` where they differ. Tail
/// indices present only in the snapshot are the deleted ones, each
/// carrying its last-saved value.
///
/// Removing an element shifts every later element down one position,
/// which naturally forces the shifted range to `Modified` and vacates the
/// tail index as `Deleted`.
#[derive(Debug, Clone)]
pub struct RelationOrderedList<T> {
    current: Vec<T>,
    last_saved: Vec<T>,
}

impl<T> Default for RelationOrderedList<T> {
    fn default() -> Self {
        Self {
            current: Vec::new(),
            last_saved: Vec::new(),
        }
    }
}

impl<T: Clone + PartialEq> RelationOrderedList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Returns `true` if there are no live elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Returns the element at `index`, untracked.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.current.get(index)
    }

    /// Returns the status of the element at `index`.
    #[must_use]
    pub fn status(&self, index: usize) -> Option<Status> {
        if index >= self.current.len() {
            return None;
        }
        Some(self.status_at(index))
    }

    /// Iterates the live elements in order, untracked.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.current.iter()
    }

    /// Appends `value` at the tail.
    pub fn push(&mut self, value: T) {
        self.current.push(value);
    }

    /// Inserts `value` at `index`, shifting later elements up.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> CoreResult<()> {
        if index > self.current.len() {
            return Err(self.out_of_range(index));
        }
        self.current.insert(index, value);
        Ok(())
    }

    /// Overwrites the element at `index`.
    ///
    /// Writing back the value already at `index` leaves the status
    /// `Saved`; status is derived from the snapshot, not from the act of
    /// writing.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= len`.
    pub fn set(&mut self, index: usize, value: T) -> CoreResult<()> {
        if index >= self.current.len() {
            return Err(self.out_of_range(index));
        }
        self.current[index] = value;
        Ok(())
    }

    /// Removes the element at `index`, shifting later elements down.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= len`.
    pub fn remove(&mut self, index: usize) -> CoreResult<T> {
        if index >= self.current.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.current.remove(index))
    }

    /// Removes every live element; the whole snapshot becomes deleted
    /// tail indices.
    pub fn clear(&mut self) {
        self.current.clear();
    }

    fn status_at(&self, index: usize) -> Status {
        if index >= self.last_saved.len() {
            Status::New
        } else if self.current[index] == self.last_saved[index] {
            Status::Saved
        } else {
            Status::Modified
        }
    }

    fn out_of_range(&self, index: usize) -> CoreError {
        CoreError::IndexOutOfRange {
            index,
            len: self.current.len(),
        }
    }
}

impl<T: Clone + PartialEq> Relation for RelationOrderedList<T> {
    type Elem = (usize, T);

    fn diff(&self) -> Vec<((usize, T), Status)> {
        let deleted_tail = self.last_saved.len().saturating_sub(self.current.len());
        let mut out = Vec::with_capacity(deleted_tail + self.current.len());
        // Vacated tail indices first, each carrying its last-saved value.
        for index in self.current.len()..self.last_saved.len() {
            out.push(((index, self.last_saved[index].clone()), Status::Deleted));
        }
        for (index, value) in self.current.iter().enumerate() {
            out.push(((index, value.clone()), self.status_at(index)));
        }
        out
    }

    fn canonicalize(&mut self) {
        self.last_saved = self.current.clone();
    }

    fn repopulate(&mut self, (index, value): (usize, T)) -> CoreResult<()> {
        if self.current != self.last_saved {
            return Err(CoreError::DirtyRepopulate);
        }
        if index != self.current.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.current.len(),
            });
        }
        self.current.push(value.clone());
        self.last_saved.push(value);
        Ok(())
    }

    fn unsaved_entries(&self) -> usize {
        let deleted_tail = self.last_saved.len().saturating_sub(self.current.len());
        deleted_tail
            + (0..self.current.len())
                .filter(|&i| self.status_at(i).is_unsaved())
                .count()
    }
}

impl<T: Clone + PartialEq> FromIterator<T> for RelationOrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            current: iter.into_iter().collect(),
            last_saved: Vec::new(),
        }
    }
}
