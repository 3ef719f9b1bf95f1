//! Edit session - at most one record is being edited at a time.

use tracing::debug;

use super::RecordCoordinator;
use crate::cache::PendingEdit;
use crate::error::SyncError;
use crate::record::{Record, RecordId, RecordPatch};
use crate::remote::RecordService;

impl<S: RecordService> RecordCoordinator<S> {
    /// Start editing record `id`, discarding any other pending edit.
    pub fn begin_edit(&self, id: RecordId) -> Result<PendingEdit, SyncError> {
        self.cache().write("begin_edit", |state| -> Result<PendingEdit, SyncError> {
            let record = state
                .collection
                .get(id)
                .ok_or(SyncError::UnknownRecord(id))?;
            let edit = PendingEdit {
                id,
                draft: RecordPatch::from(record),
            };
            if let Some(previous) = state.pending_edit.replace(edit.clone()) {
                if previous.id != id {
                    debug!(previous = previous.id, id, "pending edit replaced");
                }
            }
            Ok(edit)
        })?
    }

    /// Change the draft values of the pending edit. Returns false when no
    /// edit is pending.
    pub fn edit_fields(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<bool, SyncError> {
        let (name, email) = (name.into(), email.into());
        self.cache().write("edit_fields", |state| match state.pending_edit.as_mut() {
            Some(edit) => {
                edit.draft = RecordPatch { name, email };
                true
            }
            None => false,
        })
    }

    pub fn pending_edit(&self) -> Result<Option<PendingEdit>, SyncError> {
        self.cache()
            .read("pending_edit", |state| state.pending_edit.clone())
    }

    /// Drop the pending edit without calling the service.
    pub fn cancel_edit(&self) -> Result<Option<PendingEdit>, SyncError> {
        self.cache()
            .write("cancel_edit", |state| state.pending_edit.take())
    }

    /// Clear the pending edit and run `update` with its draft values.
    /// Returns `Ok(None)` when nothing was being edited.
    pub async fn commit_edit(&self) -> Result<Option<Record>, SyncError> {
        let edit = match self
            .cache()
            .write("commit_edit", |state| state.pending_edit.take())?
        {
            Some(edit) => edit,
            None => return Ok(None),
        };
        self.update(edit.id, edit.draft).await.map(Some)
    }
}
