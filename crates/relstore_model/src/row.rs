//! Row type: an ordered sequence of values.

use crate::error::{ValueError, ValueResult};
use crate::value::Value;

/// An ordered sequence of [`Value`]s.
///
/// A row's meaning comes entirely from the [`TableSchema`] it is paired
/// with: the value at index `i` belongs to the schema's column `i`, and
/// the first `key_width` values form the primary key (or, for relation
/// tables, the owner-key prefix plus the element key/position).
///
/// [`TableSchema`]: crate::schema::TableSchema
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a row with the given capacity hint.
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            values: Vec::with_capacity(cap),
        }
    }

    /// Appends a value.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Returns the value at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the value at `index`, or a typed error naming the row shape.
    pub fn column(&self, index: usize) -> ValueResult<&Value> {
        self.values.get(index).ok_or(ValueError::MissingColumn {
            index,
            len: self.values.len(),
        })
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the row has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the values in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Returns the underlying values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns a new row holding the first `width` values.
    #[must_use]
    pub fn prefix(&self, width: usize) -> Self {
        Self {
            values: self.values[..width.min(self.values.len())].to_vec(),
        }
    }

    /// Returns a new row holding the values from `width` onward.
    #[must_use]
    pub fn suffix(&self, width: usize) -> Self {
        Self {
            values: self.values[width.min(self.values.len())..].to_vec(),
        }
    }

    /// Returns `true` if this row's leading values equal `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.values.len() >= prefix.values.len()
            && self.values[..prefix.values.len()] == prefix.values[..]
    }

    /// Concatenates `other` onto a copy of this row.
    #[must_use]
    pub fn joined(&self, other: &Self) -> Self {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Self { values }
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Builds a row from a list of expressions convertible to [`Value`].
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        $crate::Row::from(vec![$($crate::Value::from($value)),*])
    };
}
