//! Backend wrappers for observing and perturbing command traffic.
//!
//! [`RecordingBackend`] logs every call so tests can assert on batching
//! and ordering; [`FaultBackend`] injects one-shot failures to exercise
//! the rollback contract.

use parking_lot::Mutex;
use relstore_backend::{Backend, BackendError, BackendResult, Operation};
use relstore_model::{Row, TableSchema};
use std::sync::Arc;

/// The kind of one logged backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `begin` was called.
    Begin,
    /// `commit` was called.
    Commit,
    /// `rollback` was called.
    Rollback,
    /// A `CreateTable` operation was executed.
    CreateTable,
    /// An `Insert` operation was executed.
    Insert,
    /// An `Update` operation was executed.
    Update,
    /// A `Delete` operation was executed.
    Delete,
}

/// One logged backend call, recorded before delegation (so failed calls
/// still appear).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// The call kind.
    pub kind: CommandKind,
    /// The addressed table, for `execute` calls.
    pub table: Option<String>,
    /// The number of rows the operation carried.
    pub rows: usize,
}

/// A cloneable handle onto a [`RecordingBackend`]'s log.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    entries: Arc<Mutex<Vec<CommandRecord>>>,
}

impl CommandLog {
    /// Returns a copy of every record so far, in call order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CommandRecord> {
        self.entries.lock().clone()
    }

    /// Discards all records.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Counts records of the given kind.
    #[must_use]
    pub fn kind_count(&self, kind: CommandKind) -> usize {
        self.entries.lock().iter().filter(|r| r.kind == kind).count()
    }

    /// Returns the records addressing `table`, in call order.
    #[must_use]
    pub fn for_table(&self, table: &str) -> Vec<CommandRecord> {
        self.entries
            .lock()
            .iter()
            .filter(|r| r.table.as_deref() == Some(table))
            .cloned()
            .collect()
    }

    fn push(&self, kind: CommandKind, table: Option<&str>, rows: usize) {
        self.entries.lock().push(CommandRecord {
            kind,
            table: table.map(str::to_owned),
            rows,
        });
    }
}

/// Wraps a backend and logs every call.
#[derive(Debug)]
pub struct RecordingBackend<B> {
    inner: B,
    log: CommandLog,
}

impl<B: Backend> RecordingBackend<B> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            log: CommandLog::default(),
        }
    }

    /// Returns a handle onto the call log.
    #[must_use]
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    /// Returns the wrapped backend.
    #[must_use]
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: Backend> Backend for RecordingBackend<B> {
    fn begin(&mut self) -> BackendResult<()> {
        self.log.push(CommandKind::Begin, None, 0);
        self.inner.begin()
    }

    fn commit(&mut self) -> BackendResult<()> {
        self.log.push(CommandKind::Commit, None, 0);
        self.inner.commit()
    }

    fn rollback(&mut self) -> BackendResult<()> {
        self.log.push(CommandKind::Rollback, None, 0);
        self.inner.rollback()
    }

    fn execute(&mut self, table: &TableSchema, op: &Operation) -> BackendResult<()> {
        let kind = match op {
            Operation::CreateTable => CommandKind::CreateTable,
            Operation::Insert { .. } => CommandKind::Insert,
            Operation::Update { .. } => CommandKind::Update,
            Operation::Delete { .. } => CommandKind::Delete,
        };
        self.log.push(kind, Some(&table.name), op.row_count());
        self.inner.execute(table, op)
    }

    fn select_all(&mut self, table: &TableSchema) -> BackendResult<Vec<Row>> {
        self.inner.select_all(table)
    }
}

#[derive(Debug, Default)]
struct ArmedFaults {
    commit: bool,
    rollback: bool,
    execute_on: Option<String>,
}

/// A cloneable handle arming one-shot faults on a [`FaultBackend`].
///
/// Each armed fault fires on the next matching call, then clears itself,
/// so a test can stage "commit fails, rollback succeeds" and
/// "commit fails, rollback fails" scenarios precisely, even after the
/// backend has been handed to an orchestrator.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    armed: Arc<Mutex<ArmedFaults>>,
}

impl FaultPlan {
    /// Arms a one-shot failure of the next `commit`.
    pub fn fail_next_commit(&self) {
        self.armed.lock().commit = true;
    }

    /// Arms a one-shot failure of the next `rollback`.
    pub fn fail_next_rollback(&self) {
        self.armed.lock().rollback = true;
    }

    /// Arms a one-shot failure of the next `execute` addressing `table`.
    pub fn fail_next_execute_on(&self, table: impl Into<String>) {
        self.armed.lock().execute_on = Some(table.into());
    }
}

/// Wraps a backend and fails calls armed through its [`FaultPlan`].
#[derive(Debug)]
pub struct FaultBackend<B> {
    inner: B,
    plan: FaultPlan,
}

impl<B: Backend> FaultBackend<B> {
    /// Wraps `inner` with no faults armed.
    #[must_use]
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            plan: FaultPlan::default(),
        }
    }

    /// Returns a handle for arming faults.
    #[must_use]
    pub fn plan(&self) -> FaultPlan {
        self.plan.clone()
    }

    /// Returns the wrapped backend.
    #[must_use]
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: Backend> Backend for FaultBackend<B> {
    fn begin(&mut self) -> BackendResult<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> BackendResult<()> {
        if std::mem::take(&mut self.plan.armed.lock().commit) {
            return Err(BackendError::failure("injected commit failure"));
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> BackendResult<()> {
        if std::mem::take(&mut self.plan.armed.lock().rollback) {
            return Err(BackendError::failure("injected rollback failure"));
        }
        self.inner.rollback()
    }

    fn execute(&mut self, table: &TableSchema, op: &Operation) -> BackendResult<()> {
        let armed = self.plan.armed.lock().execute_on.take_if(|t| *t == table.name);
        if let Some(name) = armed {
            return Err(BackendError::failure(format!(
                "injected execute failure on {name}"
            )));
        }
        self.inner.execute(table, op)
    }

    fn select_all(&mut self, table: &TableSchema) -> BackendResult<Vec<Row>> {
        self.inner.select_all(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relstore_backend::MemoryBackend;
    use relstore_model::{row, ColumnSchema, ValueType};

    fn table() -> TableSchema {
        TableSchema::new(
            "t",
            vec![
                ColumnSchema::new("id", ValueType::Integer),
                ColumnSchema::new("v", ValueType::Text),
            ],
            1,
        )
    }

    #[test]
    fn recording_backend_logs_in_call_order() {
        let mut backend = RecordingBackend::new(MemoryBackend::new());
        let log = backend.log();
        let t = table();

        backend.begin().unwrap();
        backend.execute(&t, &Operation::CreateTable).unwrap();
        backend
            .execute(
                &t,
                &Operation::Insert {
                    rows: vec![row![1i64, "a"], row![2i64, "b"]],
                },
            )
            .unwrap();
        backend.commit().unwrap();

        let kinds: Vec<_> = log.snapshot().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::Begin,
                CommandKind::CreateTable,
                CommandKind::Insert,
                CommandKind::Commit,
            ]
        );
        assert_eq!(log.for_table("t")[1].rows, 2);
    }

    #[test]
    fn failed_calls_are_still_logged() {
        let mut backend = RecordingBackend::new(MemoryBackend::new());
        let log = backend.log();
        assert!(backend.commit().is_err());
        assert_eq!(log.kind_count(CommandKind::Commit), 1);
    }

    #[test]
    fn commit_fault_fires_once() {
        let mut backend = FaultBackend::new(MemoryBackend::new());
        let plan = backend.plan();
        plan.fail_next_commit();

        backend.begin().unwrap();
        assert_eq!(
            backend.commit(),
            Err(BackendError::failure("injected commit failure"))
        );
        backend.commit().unwrap();
    }

    #[test]
    fn execute_fault_targets_one_table() {
        let mut backend = FaultBackend::new(MemoryBackend::new());
        let plan = backend.plan();
        let t = table();
        backend.begin().unwrap();
        backend.execute(&t, &Operation::CreateTable).unwrap();

        plan.fail_next_execute_on("t");
        assert!(backend
            .execute(&t, &Operation::Insert { rows: vec![row![1i64, "a"]] })
            .is_err());
        backend
            .execute(&t, &Operation::Insert { rows: vec![row![1i64, "a"]] })
            .unwrap();

        plan.fail_next_execute_on("other");
        backend
            .execute(&t, &Operation::Insert { rows: vec![row![2i64, "b"]] })
            .unwrap();
    }
}
