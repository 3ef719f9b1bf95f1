//! Remote record service - the flaky CRUD endpoint the coordinator syncs against.
//!
//! The coordinator only depends on the [`RecordService`] trait. Two backends
//! ship with the crate:
//!
//! - [`HttpRecordService`] (feature `http`): a reqwest client for a REST
//!   resource such as `https://jsonplaceholder.typicode.com/users`.
//! - [`InMemoryRecordService`]: an in-process service for tests and demos,
//!   with failure injection and gates that hold a call in flight.
//!
//! ## Example
//!
//! ```ignore
//! use optimistic_records::{HttpRecordService, RecordCoordinator, SyncConfig};
//!
//! let config = SyncConfig::default().apply_env_overrides()?;
//! let service = HttpRecordService::from_config(&config)?;
//! let coordinator = RecordCoordinator::with_service(service).with_label(&config.label);
//! coordinator.list().await?;
//! ```

mod error;
#[cfg(feature = "http")]
mod http;
mod in_memory;

use std::future::Future;

use crate::record::{Record, RecordDraft, RecordId, RemoteRecord};

pub use error::RemoteError;
#[cfg(feature = "http")]
pub use http::HttpRecordService;
pub use in_memory::{CreateIdPolicy, Gate, InMemoryRecordService, Operation};

/// The remote side of the collection.
///
/// Futures are `Send` so coordinator operations can be spawned onto a
/// multi-threaded runtime.
pub trait RecordService: Send + Sync {
    /// Fetch the full remote collection, in server order.
    fn list(&self) -> impl Future<Output = Result<Vec<Record>, RemoteError>> + Send;

    /// Create a record. The response may lack a usable id.
    fn create(
        &self,
        draft: &RecordDraft,
    ) -> impl Future<Output = Result<RemoteRecord, RemoteError>> + Send;

    /// Replace the record with `record.id` by the full record.
    fn update(
        &self,
        record: &Record,
    ) -> impl Future<Output = Result<RemoteRecord, RemoteError>> + Send;

    /// Delete the record. Any response body is ignored.
    fn delete(&self, id: RecordId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
