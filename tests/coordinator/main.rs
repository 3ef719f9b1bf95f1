//! Coordinator integration tests.
//!
//! Drives `RecordCoordinator` against `InMemoryRecordService`, using
//! failure injection and gates to hold remote calls in flight.

mod update;
