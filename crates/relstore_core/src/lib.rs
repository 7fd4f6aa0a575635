//! # RelStore Core
//!
//! Persists plain Rust entity structs into a relational backend without
//! hand-written SQL or manual dirty tracking.
//!
//! This crate provides the two core subsystems:
//!
//! - **Change-tracking relation containers** ([`RelationList`],
//!   [`RelationSet`], [`RelationMap`], [`RelationOrderedList`]) - wrap a
//!   plain collection and record, per element, whether it is [`Status::New`],
//!   [`Status::Saved`], deleted, or (ordered case) repositioned since the
//!   last successful write.
//! - **Transaction orchestrator** ([`Transactor`]) - decomposes a batch of
//!   entities into principal and relation rows, orders the touched tables
//!   along their foreign-key dependencies, batches same-table commands, and
//!   executes everything inside one all-or-nothing backend transaction.
//!
//! Entity types plug in through the [`Persist`] trait (one principal table
//! plus a relation table per container property); the backend plugs in
//! through [`relstore_backend::Backend`].

pub mod depot;
pub mod error;
pub mod persist;
pub mod registry;
pub mod relation;
pub mod status;
pub mod transactor;

pub use depot::Depot;
pub use error::{CoreError, CoreResult};
pub use persist::{EntitySchema, Persist, Record, RelationKind, RelationTable};
pub use registry::Registry;
pub use relation::{Relation, RelationList, RelationMap, RelationOrderedList, RelationSet};
pub use status::Status;
pub use transactor::Transactor;
