//! Key-value map container (unique keys, duplicate values allowed).

use crate::error::{CoreError, CoreResult};
use crate::relation::Relation;
use crate::status::Status;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A change-tracking map.
///
/// Tracking is per key. Overwriting a live key is defined as remove(k)
/// followed by add(k, v): against the back end it always produces a
/// delete-then-insert pair, never an update in place. Re-adding a pair
/// that exactly matches a pending deletion (key *and* value) cancels the
/// deletion and re-enters as `Saved`.
#[derive(Debug, Clone)]
pub struct RelationMap<K, V> {
    entries: BTreeMap<K, (V, Status)>,
    pending: BTreeMap<K, V>,
}

impl<K, V> Default for RelationMap<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }
}

impl<K: Clone + Ord + Debug, V: Clone + PartialEq> RelationMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the live value for `key`, untracked.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(value, _)| value)
    }

    /// Returns the status of the entry at `key`.
    #[must_use]
    pub fn status(&self, key: &K) -> Option<Status> {
        self.entries.get(key).map(|(_, status)| *status)
    }

    /// Returns `true` if `key` is live.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates the live `(key, value)` pairs in key order, untracked.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, (v, _))| (k, v))
    }

    /// Inserts `value` at `key`, returning the displaced value if any.
    ///
    /// Overwriting a live key behaves as remove-then-add: a `Saved` old
    /// value is recorded as a pending deletion first, then the new pair
    /// enters as `New` - unless it exactly matches the pending entry for
    /// this key, in which case it re-enters as `Saved` and the pending
    /// entry is dropped.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let displaced = match self.entries.remove(&key) {
            Some((old, Status::Saved)) => {
                self.pending.insert(key.clone(), old.clone());
                Some(old)
            }
            Some((old, _)) => Some(old),
            None => None,
        };
        let status = match self.pending.get(&key) {
            Some(pending_value) if *pending_value == value => {
                self.pending.remove(&key);
                Status::Saved
            }
            _ => Status::New,
        };
        self.entries.insert(key, (value, status));
        displaced
    }

    /// Removes the entry at `key`, returning its value.
    ///
    /// A `Saved` entry is recorded as a pending `(key, value)` deletion; a
    /// `New` entry vanishes.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if `key` is not live.
    pub fn remove(&mut self, key: &K) -> CoreResult<V> {
        match self.entries.remove(key) {
            Some((value, Status::Saved)) => {
                self.pending.insert(key.clone(), value.clone());
                Ok(value)
            }
            Some((value, _)) => Ok(value),
            None => Err(CoreError::key_not_found(key)),
        }
    }

    /// Removes every live entry, recording pending deletions for the
    /// `Saved` ones.
    pub fn clear(&mut self) {
        let drained = std::mem::take(&mut self.entries);
        for (key, (value, status)) in drained {
            if status == Status::Saved {
                self.pending.insert(key, value);
            }
        }
    }

    /// Adds an already-persisted entry; the keyed form of
    /// [`Relation::repopulate`].
    pub fn repopulate_entry(&mut self, key: K, value: V) -> CoreResult<()> {
        self.repopulate((key, value))
    }
}

impl<K: Clone + Ord + Debug, V: Clone + PartialEq> Relation for RelationMap<K, V> {
    type Elem = (K, V);

    fn diff(&self) -> Vec<((K, V), Status)> {
        let mut out = Vec::with_capacity(self.pending.len() + self.entries.len());
        for (key, value) in &self.pending {
            out.push(((key.clone(), value.clone()), Status::Deleted));
        }
        for (key, (value, status)) in &self.entries {
            out.push(((key.clone(), value.clone()), *status));
        }
        out
    }

    fn canonicalize(&mut self) {
        self.pending.clear();
        for (_, status) in self.entries.values_mut() {
            *status = Status::Saved;
        }
    }

    fn repopulate(&mut self, (key, value): (K, V)) -> CoreResult<()> {
        if !self.is_clean() {
            return Err(CoreError::DirtyRepopulate);
        }
        if self.entries.contains_key(&key) {
            return Err(CoreError::duplicate_element(&key));
        }
        self.entries.insert(key, (value, Status::Saved));
        Ok(())
    }

    fn unsaved_entries(&self) -> usize {
        self.pending.len()
            + self
                .entries
                .values()
                .filter(|(_, status)| status.is_unsaved())
                .count()
    }
}

impl<K: Clone + Ord + Debug, V: Clone + PartialEq> FromIterator<(K, V)> for RelationMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(pairs: &[(&str, i64)]) -> RelationMap<String, i64> {
        let mut map: RelationMap<String, i64> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), *v))
            .collect();
        map.canonicalize();
        map
    }

    #[test]
    fn fresh_entries_are_new() {
        let mut map = RelationMap::new();
        map.insert("a".to_owned(), 1);
        assert_eq!(map.status(&"a".to_owned()), Some(Status::New));
    }

    #[test]
    fn remove_of_saved_records_key_and_value() {
        let mut map = saved(&[("a", 1)]);
        assert_eq!(map.remove(&"a".to_owned()).unwrap(), 1);
        assert_eq!(map.diff(), vec![(("a".to_owned(), 1), Status::Deleted)]);
    }

    #[test]
    fn remove_of_missing_key_fails() {
        let mut map = saved(&[("a", 1)]);
        assert!(matches!(
            map.remove(&"x".to_owned()),
            Err(CoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn readd_with_same_value_restores_saved() {
        let mut map = saved(&[("a", 1)]);
        map.remove(&"a".to_owned()).unwrap();
        map.insert("a".to_owned(), 1);
        assert_eq!(map.status(&"a".to_owned()), Some(Status::Saved));
        assert!(map.is_clean());
    }

    #[test]
    fn readd_with_different_value_is_new() {
        let mut map = saved(&[("a", 1)]);
        map.remove(&"a".to_owned()).unwrap();
        map.insert("a".to_owned(), 2);
        assert_eq!(map.status(&"a".to_owned()), Some(Status::New));
        // The old pair remains pending deletion.
        assert_eq!(map.diff()[0], (("a".to_owned(), 1), Status::Deleted));
    }

    #[test]
    fn overwrite_is_delete_then_insert() {
        let mut map = saved(&[("a", 1)]);
        let displaced = map.insert("a".to_owned(), 2);
        assert_eq!(displaced, Some(1));
        assert_eq!(
            map.diff(),
            vec![
                (("a".to_owned(), 1), Status::Deleted),
                (("a".to_owned(), 2), Status::New),
            ]
        );
    }

    #[test]
    fn same_value_overwrite_cancels_out() {
        let mut map = saved(&[("a", 1)]);
        map.insert("a".to_owned(), 1);
        assert_eq!(map.status(&"a".to_owned()), Some(Status::Saved));
        assert!(map.is_clean());
    }

    #[test]
    fn overwrite_of_new_key_stays_single_new() {
        let mut map = RelationMap::new();
        map.insert("a".to_owned(), 1);
        map.insert("a".to_owned(), 2);
        assert_eq!(map.diff(), vec![(("a".to_owned(), 2), Status::New)]);
    }

    #[test]
    fn clear_records_saved_entries() {
        let mut map = saved(&[("a", 1), ("b", 2)]);
        map.insert("c".to_owned(), 3);
        map.clear();
        let diff = map.diff();
        assert_eq!(
            diff,
            vec![
                (("a".to_owned(), 1), Status::Deleted),
                (("b".to_owned(), 2), Status::Deleted),
            ]
        );
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let mut map = saved(&[("a", 1)]);
        map.insert("b".to_owned(), 2);
        map.canonicalize();
        let once = map.diff();
        map.canonicalize();
        assert_eq!(map.diff(), once);
    }

    #[test]
    fn repopulate_rejects_duplicate_key() {
        let mut map = RelationMap::new();
        map.repopulate_entry("a".to_owned(), 1).unwrap();
        assert!(matches!(
            map.repopulate_entry("a".to_owned(), 2),
            Err(CoreError::DuplicateElement { .. })
        ));
    }

    #[test]
    fn repopulate_requires_clean() {
        let mut map = RelationMap::new();
        map.insert("a".to_owned(), 1);
        assert!(matches!(
            map.repopulate_entry("b".to_owned(), 2),
            Err(CoreError::DirtyRepopulate)
        ));
    }
}
