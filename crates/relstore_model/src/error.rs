//! Error types for the model layer.

use crate::value::ValueType;
use thiserror::Error;

/// Result type for model operations.
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors raised when converting or inspecting values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A value had a different type than the conversion expected.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The type the caller asked for.
        expected: ValueType,
        /// The type the value actually had.
        actual: ValueType,
    },

    /// A row was missing a column at the given index.
    #[error("missing column {index} (row has {len} columns)")]
    MissingColumn {
        /// The requested column index.
        index: usize,
        /// The number of columns in the row.
        len: usize,
    },
}

impl ValueError {
    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: ValueType, actual: ValueType) -> Self {
        Self::TypeMismatch { expected, actual }
    }
}
