//! Recovery error types
//!
//! Error codes:
//! - REL_LOG_CORRUPTION (FATAL)
//! - REL_RECOVERY_FAILED (FATAL)

use std::fmt;

use crate::wal::{WalError, WalErrorCode};

/// Recovery-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryErrorCode {
    /// The durability log is corrupted
    RelLogCorruption,
    /// Recovery could not write its own records
    RelRecoveryFailed,
}

impl RecoveryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            RecoveryErrorCode::RelLogCorruption => "REL_LOG_CORRUPTION",
            RecoveryErrorCode::RelRecoveryFailed => "REL_RECOVERY_FAILED",
        }
    }
}

impl fmt::Display for RecoveryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Recovery error; every recovery error is fatal to bootstrap
#[derive(Debug)]
pub struct RecoveryError {
    code: RecoveryErrorCode,
    message: String,
}

impl RecoveryError {
    pub fn code(&self) -> RecoveryErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl From<WalError> for RecoveryError {
    fn from(e: WalError) -> Self {
        let code = match e.code() {
            WalErrorCode::RelLogCorruption => RecoveryErrorCode::RelLogCorruption,
            _ => RecoveryErrorCode::RelRecoveryFailed,
        };
        Self {
            code,
            message: e.to_string(),
        }
    }
}

impl fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for RecoveryError {}

/// Result type for recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;
