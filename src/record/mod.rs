//! Records - the value snapshots held in the local collection.
//!
//! A `Record` is never mutated in place once it is visible to callers:
//! applying a [`RecordPatch`] produces a new value, which is what makes
//! snapshot-and-restore rollback exact.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Identifier of a record. Server-assigned ids are positive; ids synthesized
/// locally for records the server did not number are negative.
pub type RecordId = i64;

/// A single addressable entity in the managed collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    /// Read-only; patches never touch it.
    #[serde(default)]
    pub username: String,
}

impl Record {
    pub fn new(id: RecordId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            username: String::new(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Returns a new record with the patch applied. Id and username are kept.
    pub fn patched(&self, patch: &RecordPatch) -> Record {
        Record {
            id: self.id,
            name: patch.name.clone(),
            email: patch.email.clone(),
            username: self.username.clone(),
        }
    }

    /// True when the id was synthesized locally rather than assigned by the server.
    pub fn is_placeholder(&self) -> bool {
        self.id < 0
    }
}

/// Input for creating a record. Both fields are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub name: String,
    pub email: String,
}

impl RecordDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Client-side precondition for create. Whitespace-only counts as empty.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.name.trim().is_empty() {
            return Err(SyncError::Validation { field: "name" });
        }
        if self.email.trim().is_empty() {
            return Err(SyncError::Validation { field: "email" });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
    }
}

/// The editable fields of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub name: String,
    pub email: String,
}

impl RecordPatch {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl From<&Record> for RecordPatch {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
        }
    }
}

/// A record as returned by the remote service. Any field may be missing,
/// including the id (mock services often answer create with `id: null` or a
/// constant id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl RemoteRecord {
    /// Server-provided name, if present and non-empty.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }

    /// Builds a local record, falling back to `fallback` for missing fields.
    pub fn into_record(self, id: RecordId, fallback: &RecordDraft) -> Record {
        Record {
            id,
            name: self.name.unwrap_or_else(|| fallback.name.clone()),
            email: self.email.unwrap_or_else(|| fallback.email.clone()),
            username: self.username.unwrap_or_default(),
        }
    }
}

impl From<Record> for RemoteRecord {
    fn from(record: Record) -> Self {
        Self {
            id: Some(record.id),
            name: Some(record.name),
            email: Some(record.email),
            username: Some(record.username),
        }
    }
}
