//! # RelStore Model
//!
//! The data model shared by every RelStore layer:
//!
//! - [`Value`] - a dynamic typed cell (the only thing that crosses the
//!   backend boundary)
//! - [`Row`] - an ordered sequence of values
//! - [`TableSchema`] / [`ColumnSchema`] / [`ForeignKey`] - the minimal
//!   relational schema model the orchestrator plans against
//!
//! This crate deliberately knows nothing about entities, change tracking,
//! or transactions; those live in `relstore_core`.

pub mod error;
pub mod row;
pub mod schema;
pub mod value;

pub use error::{ValueError, ValueResult};
pub use row::Row;
pub use schema::{ColumnSchema, DeleteBehavior, ForeignKey, TableSchema};
pub use value::{Value, ValueType};
