//! Recovery subsystem
//!
//! Runs once at bootstrap when the data directory already existed.
//!
//! # Sequence (strict order)
//!
//! 1. Read the durability log back to the last checkpoint
//! 2. Classify transactions (committed / rolled back / incomplete)
//! 3. Close incomplete transactions with ROLLBACK
//! 4. Write a CHECKPOINT and fsync
//!
//! Any log corruption halts bootstrap.

mod errors;
mod manager;

pub use errors::{RecoveryError, RecoveryErrorCode, RecoveryResult};
pub use manager::{max_tx_id, RecoveryManager, RecoverySummary};
