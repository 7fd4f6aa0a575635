//! # RelStore Testkit
//!
//! Shared test utilities for the RelStore workspace:
//!
//! - [`fixtures`] - a small library domain (authors and books) covering
//!   all four relation container kinds, an enum-as-string column, and an
//!   entity-to-entity foreign key
//! - [`backends`] - a recording backend for asserting on batched command
//!   traffic and a fault-injecting backend for rollback tests
//! - [`depot`] - a vector depot with typed extraction
//!
//! The workspace integration and property suites live in this crate's
//! `tests/` directory.

pub mod backends;
pub mod depot;
pub mod fixtures;

pub use backends::{
    CommandKind, CommandLog, CommandRecord, FaultBackend, FaultPlan, RecordingBackend,
};
pub use depot::VecDepot;
pub use fixtures::{Author, Book, Genre};

/// Initializes an env-filtered tracing subscriber for test runs.
///
/// Safe to call from multiple tests; only the first call installs the
/// subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
