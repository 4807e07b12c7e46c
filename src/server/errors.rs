//! Engine lifecycle errors
//!
//! Error codes:
//! - REL_CONFIG_INVALID
//! - REL_BOOT_FAILED
//! - REL_LOG_CORRUPTION
//! - REL_SHUTDOWN_FAILED

use std::fmt;

use crate::buffer::BufferError;
use crate::catalog::CatalogError;
use crate::recovery::{RecoveryError, RecoveryErrorCode};
use crate::storage::StorageError;
use crate::wal::{WalError, WalErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorCode {
    /// Configuration missing or invalid
    RelConfigInvalid,
    /// A collaborator could not be constructed
    RelBootFailed,
    /// The durability log is corrupted
    RelLogCorruption,
    /// Shutdown could not make the log durable
    RelShutdownFailed,
}

impl ServerErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ServerErrorCode::RelConfigInvalid => "REL_CONFIG_INVALID",
            ServerErrorCode::RelBootFailed => "REL_BOOT_FAILED",
            ServerErrorCode::RelLogCorruption => "REL_LOG_CORRUPTION",
            ServerErrorCode::RelShutdownFailed => "REL_SHUTDOWN_FAILED",
        }
    }
}

impl fmt::Display for ServerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug)]
pub struct ServerError {
    code: ServerErrorCode,
    message: String,
}

impl ServerError {
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self {
            code: ServerErrorCode::RelConfigInvalid,
            message: message.into(),
        }
    }

    pub fn boot_failed(message: impl Into<String>) -> Self {
        Self {
            code: ServerErrorCode::RelBootFailed,
            message: message.into(),
        }
    }

    pub fn shutdown_failed(message: impl Into<String>) -> Self {
        Self {
            code: ServerErrorCode::RelShutdownFailed,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ServerErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ServerError {}

impl From<WalError> for ServerError {
    fn from(e: WalError) -> Self {
        let code = match e.code() {
            WalErrorCode::RelLogCorruption => ServerErrorCode::RelLogCorruption,
            _ => ServerErrorCode::RelBootFailed,
        };
        Self {
            code,
            message: e.to_string(),
        }
    }
}

impl From<RecoveryError> for ServerError {
    fn from(e: RecoveryError) -> Self {
        let code = match e.code() {
            RecoveryErrorCode::RelLogCorruption => ServerErrorCode::RelLogCorruption,
            RecoveryErrorCode::RelRecoveryFailed => ServerErrorCode::RelBootFailed,
        };
        Self {
            code,
            message: e.to_string(),
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(e: StorageError) -> Self {
        Self::boot_failed(e.to_string())
    }
}

impl From<BufferError> for ServerError {
    fn from(e: BufferError) -> Self {
        Self::boot_failed(e.to_string())
    }
}

impl From<CatalogError> for ServerError {
    fn from(e: CatalogError) -> Self {
        Self::boot_failed(e.to_string())
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
