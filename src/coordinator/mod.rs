//! RecordCoordinator - optimistic create/update/delete over a record service.
//!
//! | Operation | Local write                  | On failure                     |
//! |-----------|------------------------------|--------------------------------|
//! | `list`    | after the fetch resolves     | list state becomes `Failed`    |
//! | `create`  | after confirmation (prepend) | collection unchanged           |
//! | `update`  | immediately (speculative)    | rolled back to the snapshot    |
//! | `delete`  | after confirmation (remove)  | record stays                   |
//!
//! Every remote failure becomes an error notification; successful mutations
//! emit a success notification. Nothing is retried.
//!
//! ## Example
//!
//! ```ignore
//! use optimistic_records::{InMemoryRecordService, RecordCoordinator, RecordPatch};
//!
//! let coordinator = RecordCoordinator::with_service(InMemoryRecordService::new());
//! coordinator.list().await?;
//! coordinator.begin_edit(1)?;
//! coordinator.edit_fields("Ada L", "ada@x.com")?;
//! coordinator.commit_edit().await?;
//! ```

#[allow(clippy::module_inception)]
mod coordinator;
mod edit;

pub use coordinator::RecordCoordinator;
