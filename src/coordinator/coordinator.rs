use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::cache::RecordCache;
use crate::collection::Collection;
use crate::config::DEFAULT_LABEL;
use crate::error::SyncError;
use crate::load_state::LoadState;
use crate::notify::{Notification, Notifier};
use crate::record::{Record, RecordDraft, RecordId, RecordPatch};
use crate::remote::RecordService;

/// Keeps a local [`Collection`] in step with a remote [`RecordService`].
#[derive(Clone)]
pub struct RecordCoordinator<S> {
    service: S,
    cache: RecordCache,
    notifier: Notifier,
    label: String,
}

impl<S: RecordService> RecordCoordinator<S> {
    /// Coordinator over an injected, session-scoped cache and notifier.
    pub fn new(service: S, cache: RecordCache, notifier: Notifier) -> Self {
        Self {
            service,
            cache,
            notifier,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Coordinator with a fresh cache and notifier.
    pub fn with_service(service: S) -> Self {
        Self::new(service, RecordCache::new(), Notifier::new())
    }

    /// Singular display name used in notification text.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// The current records, in display order.
    pub fn records(&self) -> Result<Vec<Record>, SyncError> {
        self.cache.read("records", |state| state.collection.to_vec())
    }

    pub fn collection(&self) -> Result<Collection, SyncError> {
        self.cache.snapshot()
    }

    pub fn get(&self, id: RecordId) -> Result<Option<Record>, SyncError> {
        self.cache
            .read("get", |state| state.collection.get(id).cloned())
    }

    pub fn list_state(&self) -> Result<LoadState<Vec<Record>>, SyncError> {
        self.cache.read("list_state", |state| {
            state
                .list_state
                .clone()
                .map(|()| state.collection.to_vec())
        })
    }

    pub fn draft_input(&self) -> Result<RecordDraft, SyncError> {
        self.cache
            .read("draft_input", |state| state.draft_input.clone())
    }

    pub fn set_draft_input(&self, draft: RecordDraft) -> Result<(), SyncError> {
        self.cache
            .write("set_draft_input", |state| state.draft_input = draft)
    }

    fn noun(&self) -> String {
        self.label.to_lowercase()
    }

    /// Fetch the remote collection and replace the local one with it.
    ///
    /// Returns `SyncError::Superseded` if a newer list or an update started
    /// while this fetch was in flight; its result is then discarded.
    pub async fn list(&self) -> Result<Vec<Record>, SyncError> {
        let generation = self.cache.write("list", |state| state.begin_list())?;
        debug!(generation, "listing records");

        match self.service.list().await {
            Ok(records) => {
                let fetched = records.len();
                let applied = self
                    .cache
                    .write("list", |state| state.apply_list(generation, records))?;
                match applied {
                    Some(records) => {
                        debug!(generation, fetched, "list applied");
                        Ok(records)
                    }
                    None => {
                        debug!(generation, "stale list discarded");
                        Err(SyncError::Superseded)
                    }
                }
            }
            Err(err) => {
                let current = self.cache.write("list", |state| {
                    state.fail_list(generation, err.to_string())
                })?;
                if current {
                    warn!(generation, %err, "list failed");
                } else {
                    debug!(generation, %err, "superseded list failed");
                }
                Err(err.into())
            }
        }
    }

    /// Create a record from `draft` and prepend it once the service confirms.
    pub async fn create(&self, draft: RecordDraft) -> Result<Record, SyncError> {
        draft.validate()?;
        debug!(name = %draft.name, "creating record");

        let remote = match self.service.create(&draft).await {
            Ok(remote) => remote,
            Err(err) => {
                warn!(%err, "create failed");
                self.notifier.error(
                    "Create Failed",
                    format!("Something went wrong while creating the {}.", self.noun()),
                );
                return Err(err.into());
            }
        };

        let announced = remote
            .display_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("New {}", self.noun()));
        let record = self.cache.write("create", |state| {
            let id = state.assign_id(remote.id);
            let record = remote.into_record(id, &draft);
            state.insert_created(record.clone());
            state.draft_input.clear();
            record
        })?;

        info!(
            id = record.id,
            placeholder = record.is_placeholder(),
            "record created"
        );
        self.notifier.success(
            format!("{} Created", self.label),
            format!("{} has been added successfully.", announced),
        );
        Ok(record)
    }

    /// Create a record from the owned draft input.
    pub async fn submit_draft(&self) -> Result<Record, SyncError> {
        let draft = self.draft_input()?;
        self.create(draft).await
    }

    /// Apply `patch` to record `id` immediately, then confirm it remotely.
    ///
    /// On success the collection is reconciled with a fresh list. On failure
    /// the speculative write is rolled back.
    pub async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<Record, SyncError> {
        let write = self
            .cache
            .write("update", |state| state.begin_update(id, &patch))??;
        debug!(id, ticket = write.ticket, "speculative update applied");

        match self.service.update(&write.speculative).await {
            Ok(remote) => {
                self.cache
                    .write("update", |state| state.confirm_update(&write))?;
                let name = remote
                    .display_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| write.speculative.name.clone());
                info!(id, ticket = write.ticket, "update confirmed");
                self.notifier.success(
                    format!("{} Updated", self.label),
                    format!("{} has been updated successfully.", name),
                );

                match self.list().await {
                    Ok(_) | Err(SyncError::Superseded) => {}
                    Err(err) => warn!(id, %err, "reconcile after update failed"),
                }
                Ok(write.speculative)
            }
            Err(err) => {
                let rollback = self
                    .cache
                    .write("update", |state| state.rollback_update(&write))?;
                warn!(id, ticket = write.ticket, %err, ?rollback, "update failed, rolled back");
                self.notifier.error(
                    "Update Failed",
                    format!("Something went wrong while updating the {}.", self.noun()),
                );
                Err(err.into())
            }
        }
    }

    /// Delete record `id`. The record stays visible until the service confirms.
    pub async fn delete(&self, id: RecordId) -> Result<Record, SyncError> {
        let record = self
            .get(id)?
            .ok_or(SyncError::UnknownRecord(id))?;
        debug!(id, "deleting record");

        if let Err(err) = self.service.delete(id).await {
            warn!(id, %err, "delete failed");
            self.notifier.error(
                "Delete Failed",
                format!("{} could not be removed.", record.name),
            );
            return Err(err.into());
        }

        self.cache
            .write("delete", |state| state.remove_deleted(id))?;
        info!(id, "record deleted");
        self.notifier.success(
            format!("{} Deleted", self.label),
            format!("{} has been removed.", record.name),
        );
        Ok(record)
    }
}
