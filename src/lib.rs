mod cache;
mod collection;
mod config;
mod coordinator;
mod error;
mod load_state;
mod notify;
mod record;
mod remote;

pub use cache::{PendingEdit, RecordCache, Rollback};
pub use collection::Collection;
pub use config::{ConfigError, SyncConfig, DEFAULT_BASE_URL, DEFAULT_LABEL, DEFAULT_RESOURCE};
pub use coordinator::RecordCoordinator;
pub use error::SyncError;
pub use load_state::LoadState;
pub use notify::{Notification, NotificationKind, Notifier, NOTIFICATION_EVENT};
pub use record::{Record, RecordDraft, RecordId, RecordPatch, RemoteRecord};
#[cfg(feature = "http")]
pub use remote::HttpRecordService;
pub use remote::{
    CreateIdPolicy, Gate, InMemoryRecordService, Operation, RecordService, RemoteError,
};
