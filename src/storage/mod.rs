//! Record storage subsystem
//!
//! Table rows live in in-memory heaps owned by the storage manager. The
//! storage manager also owns the data directory, which holds the
//! durability log and the diagnostic log.
//!
//! # Design Principles
//!
//! - Row ids are slot positions and never reused
//! - Deletes tombstone, so rollback can restore in place
//! - No on-disk format for table data

mod errors;
mod heap;
mod manager;

pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use heap::{Row, RowId, TableHeap};
pub use manager::StorageManager;
