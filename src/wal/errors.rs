//! Durability log error types
//!
//! Error codes:
//! - REL_LOG_APPEND_FAILED (ERROR severity)
//! - REL_LOG_FSYNC_FAILED (FATAL severity)
//! - REL_LOG_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for log errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, engine continues
    Error,
    /// Engine must not continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Log-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalErrorCode {
    /// Log write failed
    RelLogAppendFailed,
    /// Log fsync failed
    RelLogFsyncFailed,
    /// Checksum or structure failure while reading
    RelLogCorruption,
}

impl WalErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            WalErrorCode::RelLogAppendFailed => "REL_LOG_APPEND_FAILED",
            WalErrorCode::RelLogFsyncFailed => "REL_LOG_FSYNC_FAILED",
            WalErrorCode::RelLogCorruption => "REL_LOG_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            WalErrorCode::RelLogAppendFailed => Severity::Error,
            WalErrorCode::RelLogFsyncFailed => Severity::Fatal,
            WalErrorCode::RelLogCorruption => Severity::Fatal,
        }
    }
}

impl fmt::Display for WalErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Log error type with context
#[derive(Debug)]
pub struct WalError {
    code: WalErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl WalError {
    /// Create a new append failed error
    pub fn append_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: WalErrorCode::RelLogAppendFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new fsync failed error
    pub fn fsync_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: WalErrorCode::RelLogFsyncFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new corruption error
    pub fn corruption(message: impl Into<String>) -> Self {
        Self {
            code: WalErrorCode::RelLogCorruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: WalErrorCode::RelLogCorruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> WalErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for WalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for WalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for log operations
pub type WalResult<T> = Result<T, WalError>;
