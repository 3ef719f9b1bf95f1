//! InMemoryRecordService - Vec-backed record service for testing and development.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Semaphore;

use super::{RecordService, RemoteError};
use crate::record::{Record, RecordDraft, RecordId, RemoteRecord};

/// The four calls a record service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

/// How the service numbers created records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateIdPolicy {
    /// Assign the next free id and keep the record.
    #[default]
    Assign,
    /// Answer with `id: null` and keep nothing.
    Omit,
    /// Answer with the same id every time and keep nothing, the way
    /// JSONPlaceholder answers every create with id 11.
    Fixed(RecordId),
}

/// Holds calls to one operation in flight until released.
///
/// Each call signals `entered` once it has reached the service, then waits
/// for a matching `release`. Both sides count, so the order of `entered`,
/// `release` and the calls themselves does not matter.
#[derive(Debug)]
pub struct Gate {
    entered: Semaphore,
    released: Semaphore,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            entered: Semaphore::new(0),
            released: Semaphore::new(0),
        }
    }
}

impl Gate {
    /// Wait until one more call has reached the gate.
    pub async fn entered(&self) {
        if let Ok(permit) = self.entered.acquire().await {
            permit.forget();
        }
    }

    /// Let one held call continue.
    pub fn release(&self) {
        self.released.add_permits(1);
    }

    async fn pass(&self) {
        self.entered.add_permits(1);
        if let Ok(permit) = self.released.acquire().await {
            permit.forget();
        }
    }
}

#[derive(Default)]
struct ServiceState {
    records: Vec<Record>,
    next_id: RecordId,
    create_ids: CreateIdPolicy,
    failing: HashSet<Operation>,
    fail_once: HashSet<Operation>,
    gates: HashMap<Operation, Arc<Gate>>,
    calls: Vec<Operation>,
}

/// In-memory record service. Clone-friendly via Arc; clones share state.
#[derive(Clone, Default)]
pub struct InMemoryRecordService {
    state: Arc<Mutex<ServiceState>>,
}

impl InMemoryRecordService {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Seed the service. New ids continue after the highest seeded id.
    pub fn with_records(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0).max(0) + 1;
        Self {
            state: Arc::new(Mutex::new(ServiceState {
                records,
                next_id,
                ..ServiceState::default()
            })),
        }
    }

    pub fn with_create_ids(self, policy: CreateIdPolicy) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.create_ids = policy;
        }
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, ServiceState>, RemoteError> {
        self.state
            .lock()
            .map_err(|_| RemoteError::Unavailable("service state lock poisoned".into()))
    }

    /// Make every call to `operation` fail until [`recover`](Self::recover).
    pub fn fail(&self, operation: Operation) {
        if let Ok(mut state) = self.lock() {
            state.failing.insert(operation);
        }
    }

    /// Make only the next call to `operation` fail.
    pub fn fail_next(&self, operation: Operation) {
        if let Ok(mut state) = self.lock() {
            state.fail_once.insert(operation);
        }
    }

    pub fn recover(&self, operation: Operation) {
        if let Ok(mut state) = self.lock() {
            state.failing.remove(&operation);
            state.fail_once.remove(&operation);
        }
    }

    /// Hold calls to `operation` at a gate until released.
    pub fn hold(&self, operation: Operation) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        if let Ok(mut state) = self.lock() {
            state.gates.insert(operation, Arc::clone(&gate));
        }
        gate
    }

    /// Stop holding calls to `operation`. Calls already at the gate still
    /// need a release.
    pub fn unhold(&self, operation: Operation) {
        if let Ok(mut state) = self.lock() {
            state.gates.remove(&operation);
        }
    }

    /// Records currently stored by the service.
    pub fn records(&self) -> Vec<Record> {
        self.lock().map(|s| s.records.clone()).unwrap_or_default()
    }

    /// Replace the stored records, e.g. to simulate another client's write.
    pub fn set_records(&self, records: Vec<Record>) {
        if let Ok(mut state) = self.lock() {
            state.records = records;
        }
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls().iter().filter(|op| **op == operation).count()
    }

    /// Log the call and decide whether it fails, then wait at the gate if
    /// one is installed.
    async fn enter(&self, operation: Operation) -> Result<(), RemoteError> {
        let (gate, fails) = {
            let mut state = self.lock()?;
            state.calls.push(operation);
            let fails =
                state.failing.contains(&operation) || state.fail_once.remove(&operation);
            (state.gates.get(&operation).cloned(), fails)
        };

        if let Some(gate) = gate {
            gate.pass().await;
        }

        if fails {
            return Err(RemoteError::Unavailable(format!(
                "{:?} rejected by failure injection",
                operation
            )));
        }
        Ok(())
    }
}

impl RecordService for InMemoryRecordService {
    async fn list(&self) -> Result<Vec<Record>, RemoteError> {
        self.enter(Operation::List).await?;
        Ok(self.lock()?.records.clone())
    }

    async fn create(&self, draft: &RecordDraft) -> Result<RemoteRecord, RemoteError> {
        self.enter(Operation::Create).await?;
        let mut state = self.lock()?;

        let id = match state.create_ids {
            CreateIdPolicy::Assign => {
                let id = state.next_id;
                state.next_id += 1;
                state
                    .records
                    .push(Record::new(id, draft.name.clone(), draft.email.clone()));
                Some(id)
            }
            CreateIdPolicy::Omit => None,
            CreateIdPolicy::Fixed(id) => Some(id),
        };

        Ok(RemoteRecord {
            id,
            name: Some(draft.name.clone()),
            email: Some(draft.email.clone()),
            username: None,
        })
    }

    async fn update(&self, record: &Record) -> Result<RemoteRecord, RemoteError> {
        self.enter(Operation::Update).await?;
        let mut state = self.lock()?;

        let stored = state
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| RemoteError::Status {
                status: 404,
                message: format!("record {} not found", record.id),
            })?;
        *stored = record.clone();

        Ok(RemoteRecord::from(record.clone()))
    }

    async fn delete(&self, id: RecordId) -> Result<(), RemoteError> {
        self.enter(Operation::Delete).await?;
        let mut state = self.lock()?;

        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        if state.records.len() == before {
            return Err(RemoteError::Status {
                status: 404,
                message: format!("record {} not found", id),
            });
        }
        Ok(())
    }
}
