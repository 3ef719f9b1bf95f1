use std::fmt;

use crate::record::RecordId;
use crate::remote::RemoteError;

/// Error type for coordinator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A required field was empty; no remote call was issued.
    Validation { field: &'static str },
    /// The target id is not in the local collection; no remote call was issued.
    UnknownRecord(RecordId),
    /// The remote call failed to complete or returned a non-success status.
    Remote(RemoteError),
    /// A list fetch resolved after it was superseded and was not applied.
    Superseded,
    LockPoisoned(&'static str),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Validation { field } => write!(f, "{} is required", field),
            SyncError::UnknownRecord(id) => write!(f, "no record with id {} in collection", id),
            SyncError::Remote(e) => write!(f, "remote call failed: {}", e),
            SyncError::Superseded => write!(f, "list fetch superseded by a newer write"),
            SyncError::LockPoisoned(operation) => {
                write!(f, "record cache lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        SyncError::Remote(err)
    }
}
