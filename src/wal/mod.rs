//! Durability log subsystem
//!
//! Transaction lifecycle records (START / COMMIT / ROLLBACK) and
//! checkpoints are appended here. Recovery reads the log back to find
//! transactions that never finished.
//!
//! # Invariants
//!
//! - Sequence numbers are strictly increasing by one
//! - Every record is checksummed
//! - Any corruption halts the reader

mod errors;
mod reader;
mod record;
mod writer;

pub use errors::{Severity, WalError, WalErrorCode, WalResult};
pub use reader::{read_log, LogReader};
pub use record::{LogRecord, LogRecordType, RECORD_SIZE};
pub use writer::LogManager;
