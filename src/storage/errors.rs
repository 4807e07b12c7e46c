//! Storage error types
//!
//! Error codes:
//! - REL_STORAGE_IO_ERROR (ERROR severity)
//! - REL_STORAGE_TABLE_EXISTS (ERROR severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, engine continues
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure on the data directory
    RelStorageIoError,
    /// A heap with that name already exists
    RelStorageTableExists,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::RelStorageIoError => "REL_STORAGE_IO_ERROR",
            StorageErrorCode::RelStorageTableExists => "REL_STORAGE_TABLE_EXISTS",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl StorageError {
    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::RelStorageIoError,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a table exists error
    pub fn table_exists(table: &str) -> Self {
        Self {
            code: StorageErrorCode::RelStorageTableExists,
            message: format!("Heap for table '{}' already exists", table),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
