//! Log manager: append-only durability log
//!
//! - Append-only, single file
//! - Sequence numbers start at 1 and are never reused
//! - `flush` makes every appended record durable (fsync)

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::errors::{WalError, WalResult};
use super::reader::read_log;
use super::record::{LogRecord, LogRecordType};

struct LogState {
    file: File,
    /// Bytes of whole records in the file
    len: u64,
    next_lsn: u64,
    last_flushed: u64,
}

/// Log files that can be cut back to a known length
trait Truncate {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes `bytes` in full, or cuts `out` back to `valid_len`.
///
/// A torn record left at the tail would fail the next open.
fn write_record<W: Write + Truncate>(out: &mut W, bytes: &[u8], valid_len: u64) -> io::Result<()> {
    if let Err(e) = out.write_all(bytes) {
        let _ = out.truncate_to(valid_len);
        return Err(e);
    }
    Ok(())
}

/// Shared handle to the durability log
pub struct LogManager {
    path: PathBuf,
    state: Mutex<LogState>,
}

impl LogManager {
    /// Opens or creates the log file at `path`.
    ///
    /// The next sequence number continues after the last record on disk;
    /// a corrupted existing log fails the open.
    pub fn open(path: &Path) -> WalResult<Self> {
        let existing = read_log(path)?;
        let next_lsn = existing.last().map(|r| r.lsn + 1).unwrap_or(1);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                WalError::append_failed(format!("Failed to open log file: {}", path.display()), e)
            })?;
        let len = file
            .metadata()
            .map_err(|e| {
                WalError::append_failed(format!("Failed to stat log file: {}", path.display()), e)
            })?
            .len();

        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(LogState {
                file,
                len,
                next_lsn,
                last_flushed: next_lsn - 1,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record, returning its sequence number.
    ///
    /// The record is written but not yet fsynced; call `flush`.
    pub fn append(&self, record_type: LogRecordType, tx_id: u64) -> WalResult<u64> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let lsn = state.next_lsn;
        let bytes = LogRecord::new(record_type, lsn, tx_id).serialize();
        let valid_len = state.len;

        write_record(&mut state.file, &bytes, valid_len).map_err(|e| {
            WalError::append_failed(format!("Failed to write log record {}", lsn), e)
        })?;

        state.len += bytes.len() as u64;
        state.next_lsn += 1;
        Ok(lsn)
    }

    /// Makes every record up to and including `lsn` durable
    pub fn flush(&self, lsn: u64) -> WalResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if lsn <= state.last_flushed {
            return Ok(());
        }
        state
            .file
            .sync_all()
            .map_err(|e| WalError::fsync_failed(format!("fsync failed at lsn {}", lsn), e))?;
        state.last_flushed = state.next_lsn - 1;
        Ok(())
    }

    /// Makes every appended record durable
    pub fn flush_all(&self) -> WalResult<()> {
        let last = self.last_lsn();
        self.flush(last)
    }

    /// Sequence number of the last appended record, 0 if none
    pub fn last_lsn(&self) -> u64 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.next_lsn - 1
    }

    /// Re-reads the whole log from disk
    pub fn records(&self) -> WalResult<Vec<LogRecord>> {
        read_log(&self.path)
    }
}
