//! Log reader with strict corruption detection
//!
//! - Any checksum or structure failure stops reading with an error
//! - No skipping records, no repair attempts
//! - Sequence numbers must increase by exactly one

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use super::errors::{WalError, WalResult};
use super::record::{LogRecord, RECORD_SIZE};

/// Sequential reader over a log file
pub struct LogReader {
    path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
    last_lsn: u64,
}

impl LogReader {
    /// Opens a log file for reading.
    pub fn open(path: &Path) -> WalResult<Self> {
        let file = File::open(path).map_err(|e| {
            WalError::corruption(format!("Failed to open log file: {}: {}", path.display(), e))
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| WalError::corruption(format!("Failed to read log metadata: {}", e)))?
            .len();

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
            last_lsn: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the last successfully read sequence number, 0 if none.
    pub fn last_lsn(&self) -> u64 {
        self.last_lsn
    }

    /// Reads the next record.
    ///
    /// `Ok(None)` at a clean end of file; `REL_LOG_CORRUPTION` on a torn
    /// tail, bad checksum, or out-of-order sequence number.
    pub fn read_next(&mut self) -> WalResult<Option<LogRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < RECORD_SIZE as u64 {
            return Err(WalError::corruption_at_offset(
                self.current_offset,
                format!("Truncated log: {} bytes remaining", remaining),
            ));
        }

        let mut buf = [0u8; RECORD_SIZE];
        self.reader.read_exact(&mut buf).map_err(|e| {
            WalError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record: {}", e),
            )
        })?;

        let record = LogRecord::deserialize(&buf)
            .map_err(|e| WalError::corruption_at_offset(self.current_offset, e.to_string()))?;

        if record.lsn != self.last_lsn + 1 {
            return Err(WalError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Non-sequential lsn: expected {}, got {}",
                    self.last_lsn + 1,
                    record.lsn
                ),
            ));
        }

        self.last_lsn = record.lsn;
        self.current_offset += RECORD_SIZE as u64;
        Ok(Some(record))
    }

    /// Reads every remaining record in order
    pub fn read_all(&mut self) -> WalResult<Vec<LogRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Reads a whole log file; a missing file reads as empty.
pub fn read_log(path: &Path) -> WalResult<Vec<LogRecord>> {
    match std::fs::metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        _ => LogReader::open(path)?.read_all(),
    }
}
