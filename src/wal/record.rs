//! Log record types and encoding
//!
//! Each record is fixed size:
//! - Record Length (u32 LE), always 25
//! - Record Type (u8): START / COMMIT / ROLLBACK / CHECKPOINT
//! - Log Sequence Number (u64 LE)
//! - Transaction Id (u64 LE), 0 for CHECKPOINT
//! - Checksum (u32 LE), CRC32 over every preceding byte

use std::fmt;
use std::io;

use crc32fast::Hasher;

/// Encoded size of one record in bytes
pub const RECORD_SIZE: usize = 4 + 1 + 8 + 8 + 4;

/// Log record types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogRecordType {
    /// Transaction began
    Start = 0,
    /// Transaction committed
    Commit = 1,
    /// Transaction rolled back
    Rollback = 2,
    /// Quiescent checkpoint written by recovery or shutdown
    Checkpoint = 3,
}

impl LogRecordType {
    /// Convert from u8, returns None for invalid values
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LogRecordType::Start),
            1 => Some(LogRecordType::Commit),
            2 => Some(LogRecordType::Rollback),
            3 => Some(LogRecordType::Checkpoint),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogRecordType::Start => "START",
            LogRecordType::Commit => "COMMIT",
            LogRecordType::Rollback => "ROLLBACK",
            LogRecordType::Checkpoint => "CHECKPOINT",
        }
    }
}

impl fmt::Display for LogRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One decoded log record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    pub record_type: LogRecordType,
    pub lsn: u64,
    pub tx_id: u64,
}

impl LogRecord {
    pub fn new(record_type: LogRecordType, lsn: u64, tx_id: u64) -> Self {
        Self {
            record_type,
            lsn,
            tx_id,
        }
    }

    /// Encodes the record, checksum last
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RECORD_SIZE);
        buf.extend_from_slice(&(RECORD_SIZE as u32).to_le_bytes());
        buf.push(self.record_type.as_u8());
        buf.extend_from_slice(&self.lsn.to_le_bytes());
        buf.extend_from_slice(&self.tx_id.to_le_bytes());
        let checksum = compute_checksum(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Decodes and checksum-verifies one record
    pub fn deserialize(data: &[u8]) -> io::Result<Self> {
        if data.len() < RECORD_SIZE {
            return Err(invalid("record truncated"));
        }

        let length = u32::from_le_bytes(le_array(&data[0..4])) as usize;
        if length != RECORD_SIZE {
            return Err(invalid(&format!("invalid record length {}", length)));
        }

        let body_end = RECORD_SIZE - 4;
        let expected = u32::from_le_bytes(le_array(&data[body_end..RECORD_SIZE]));
        if compute_checksum(&data[..body_end]) != expected {
            return Err(invalid("checksum mismatch"));
        }

        let record_type = LogRecordType::from_u8(data[4])
            .ok_or_else(|| invalid(&format!("unknown record type {}", data[4])))?;
        let lsn = u64::from_le_bytes(le_array(&data[5..13]));
        let tx_id = u64::from_le_bytes(le_array(&data[13..21]));

        Ok(Self {
            record_type,
            lsn,
            tx_id,
        })
    }
}

fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

fn invalid(reason: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, reason.to_string())
}
