//! RecordCache - the session-owned state behind a coordinator.
//!
//! The cache is created at session start and handed to the coordinator;
//! nothing in it outlives the session. Clones share the same state.
//!
//! Two counters guard the speculative writes:
//!
//! - `list_generation` is bumped whenever a list fetch starts or an update
//!   cancels in-flight fetches. A fetch only applies its result if the
//!   generation it captured is still current.
//! - `revision` is bumped on every change to the collection. A failed update
//!   whose revision is still current restores its full snapshot; otherwise
//!   it restores only its own record.
//!
//! Confirmed creates and deletes do not cancel fetches. A fetch that started
//! before one was confirmed gets it replayed on top of its result.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::collection::Collection;
use crate::error::SyncError;
use crate::load_state::LoadState;
use crate::record::{Record, RecordDraft, RecordId, RecordPatch};

/// At most one record being edited, with its draft field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub id: RecordId,
    pub draft: RecordPatch,
}

/// Everything an in-flight update needs to confirm or undo itself.
#[derive(Debug, Clone)]
pub(crate) struct SpeculativeWrite {
    pub ticket: u64,
    pub revision: u64,
    pub snapshot: Collection,
    pub before: Record,
    pub speculative: Record,
}

/// How a failed update was undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollback {
    /// Nothing else touched the collection; the full snapshot was restored.
    Snapshot,
    /// Other writes interleaved; only this update's record was restored.
    Record,
    /// The record no longer holds this update's value (removed, refetched
    /// or overwritten); nothing was restored.
    Skipped,
}

#[derive(Debug, Clone)]
enum Confirmed {
    Created(Record),
    Deleted(RecordId),
}

#[derive(Debug)]
pub(crate) struct CacheState {
    pub collection: Collection,
    pub revision: u64,
    pub list_generation: u64,
    pub list_state: LoadState<()>,
    /// State to fall back to when an in-flight list is cancelled.
    settled_list_state: LoadState<()>,
    /// In-flight updates, by ticket.
    speculative: BTreeMap<u64, SpeculativeWrite>,
    /// Creates and deletes confirmed while a fetch may be in flight, with
    /// the list generation current at confirmation.
    confirmed: Vec<(u64, Confirmed)>,
    next_ticket: u64,
    next_placeholder: RecordId,
    pub pending_edit: Option<PendingEdit>,
    pub draft_input: RecordDraft,
}

impl Default for CacheState {
    fn default() -> Self {
        Self {
            collection: Collection::new(),
            revision: 0,
            list_generation: 0,
            list_state: LoadState::Idle,
            settled_list_state: LoadState::Idle,
            speculative: BTreeMap::new(),
            confirmed: Vec::new(),
            next_ticket: 1,
            next_placeholder: -1,
            pending_edit: None,
            draft_input: RecordDraft::default(),
        }
    }
}

impl CacheState {
    fn bump(&mut self) {
        self.revision += 1;
    }

    fn remember(&mut self, change: Confirmed) {
        if self.list_state.is_loading() {
            self.confirmed.push((self.list_generation, change));
        }
    }

    /// Start a list fetch; returns the generation it must match to apply.
    pub fn begin_list(&mut self) -> u64 {
        self.list_generation += 1;
        if !self.list_state.is_loading() {
            self.settled_list_state = self.list_state.clone();
        }
        self.list_state = LoadState::Loading;
        self.list_generation
    }

    /// Render every in-flight list fetch harmless.
    pub fn cancel_lists(&mut self) {
        self.list_generation += 1;
        if self.list_state.is_loading() {
            self.list_state = self.settled_list_state.clone();
        }
    }

    /// Replace the collection with fetched records unless the fetch was
    /// superseded. Creates and deletes confirmed after the fetch started, and
    /// in-flight speculative records, are laid back on top.
    pub fn apply_list(&mut self, generation: u64, records: Vec<Record>) -> Option<Vec<Record>> {
        if generation != self.list_generation {
            return None;
        }
        let (mut collection, dropped) = Collection::from_records(records);
        if dropped > 0 {
            warn!(dropped, "service returned duplicate ids, kept first occurrence");
        }
        for (confirmed_at, change) in self.confirmed.drain(..) {
            if confirmed_at < generation {
                continue;
            }
            match change {
                Confirmed::Created(record) => {
                    collection.prepend(record);
                }
                Confirmed::Deleted(id) => {
                    collection.remove(id);
                }
            }
        }
        for write in self.speculative.values() {
            collection.replace(write.speculative.clone());
        }
        self.collection = collection;
        self.bump();
        self.list_state = LoadState::Loaded(());
        Some(self.collection.to_vec())
    }

    /// Record a failed fetch. Returns false if the fetch was superseded.
    pub fn fail_list(&mut self, generation: u64, message: String) -> bool {
        if generation != self.list_generation {
            return false;
        }
        self.list_state = LoadState::Failed(message);
        true
    }

    /// Cancel in-flight lists, snapshot, and apply the patch in place.
    pub fn begin_update(
        &mut self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> Result<SpeculativeWrite, SyncError> {
        let before = self
            .collection
            .get(id)
            .cloned()
            .ok_or(SyncError::UnknownRecord(id))?;

        self.cancel_lists();
        let snapshot = self.collection.clone();
        let speculative = before.patched(patch);
        self.collection.replace(speculative.clone());
        self.bump();

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let write = SpeculativeWrite {
            ticket,
            revision: self.revision,
            snapshot,
            before,
            speculative,
        };
        self.speculative.insert(ticket, write.clone());
        Ok(write)
    }

    pub fn confirm_update(&mut self, write: &SpeculativeWrite) {
        self.speculative.remove(&write.ticket);
    }

    /// Undo a failed update. Later updates that were written on top of this
    /// one now treat its before-value as their own, so a rejected value is
    /// never restored by a later rollback.
    pub fn rollback_update(&mut self, write: &SpeculativeWrite) -> Rollback {
        let write = self.speculative.remove(&write.ticket).unwrap_or_else(|| write.clone());
        let outcome = self.undo(&write);

        for other in self.speculative.values_mut() {
            if other.before == write.speculative {
                other.before = write.before.clone();
            }
            if other.snapshot.get(write.speculative.id) == Some(&write.speculative) {
                other.snapshot.replace(write.before.clone());
            }
        }
        outcome
    }

    fn undo(&mut self, write: &SpeculativeWrite) -> Rollback {
        if self.revision == write.revision {
            self.collection = write.snapshot.clone();
            self.bump();
            return Rollback::Snapshot;
        }

        if self.collection.get(write.speculative.id) == Some(&write.speculative) {
            self.collection.replace(write.before.clone());
            self.bump();
            return Rollback::Record;
        }

        Rollback::Skipped
    }

    /// Pick the id for a created record: the server's, if it is positive and
    /// free locally, otherwise the next unused negative placeholder.
    pub fn assign_id(&mut self, remote_id: Option<RecordId>) -> RecordId {
        if let Some(id) = remote_id {
            if id > 0 && !self.collection.contains(id) {
                return id;
            }
        }
        loop {
            let id = self.next_placeholder;
            self.next_placeholder -= 1;
            if !self.collection.contains(id) {
                return id;
            }
        }
    }

    /// Prepend a confirmed record. A fetch already in flight replays it.
    pub fn insert_created(&mut self, record: Record) -> bool {
        self.remember(Confirmed::Created(record.clone()));
        let inserted = self.collection.prepend(record);
        if inserted {
            self.bump();
        }
        inserted
    }

    /// Remove a confirmed delete. A fetch already in flight replays it.
    pub fn remove_deleted(&mut self, id: RecordId) -> Option<Record> {
        self.remember(Confirmed::Deleted(id));
        let removed = self.collection.remove(id);
        if removed.is_some() {
            self.bump();
            if self.pending_edit.as_ref().map(|e| e.id) == Some(id) {
                self.pending_edit = None;
            }
        }
        removed
    }
}

/// Shared, session-scoped record cache. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct RecordCache {
    state: Arc<Mutex<CacheState>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that starts out holding `records`, as if a list had loaded them.
    pub fn with_records(records: Vec<Record>) -> Self {
        let cache = Self::new();
        if let Ok(mut state) = cache.state.lock() {
            let (collection, _) = Collection::from_records(records);
            state.collection = collection;
            state.list_state = LoadState::Loaded(());
        }
        cache
    }

    pub(crate) fn read<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&CacheState) -> R,
    ) -> Result<R, SyncError> {
        let state = self
            .state
            .lock()
            .map_err(|_| SyncError::LockPoisoned(operation))?;
        Ok(f(&state))
    }

    pub(crate) fn write<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut CacheState) -> R,
    ) -> Result<R, SyncError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SyncError::LockPoisoned(operation))?;
        Ok(f(&mut state))
    }

    /// A copy of the current collection.
    pub fn snapshot(&self) -> Result<Collection, SyncError> {
        self.read("snapshot", |state| state.collection.clone())
    }

    /// Number of changes applied to the collection so far.
    pub fn revision(&self) -> Result<u64, SyncError> {
        self.read("revision", |state| state.revision)
    }
}
