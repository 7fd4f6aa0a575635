//! # RelStore Backend
//!
//! The collaborator contract between the orchestrator and a relational
//! store, plus an in-memory implementation for tests.
//!
//! Backends are deliberately dumb: they execute batched table commands and
//! manage one transaction at a time. All planning - decomposition,
//! batching, dependency ordering - happens above this layer in
//! `relstore_core`.

pub mod backend;
pub mod error;
pub mod memory;

pub use backend::{Backend, Operation};
pub use error::{BackendError, BackendResult};
pub use memory::MemoryBackend;
