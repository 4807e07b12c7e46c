//! CLI-specific error types
//!
//! Every CLI error ends the process, except `REL_CLI_BAD_REQUEST`, which
//! is answered on stdout and the serving loop moves on.

use std::fmt;
use std::io;

use crate::server::{ServerError, ServerErrorCode};
use crate::wal::WalError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// A request line is not a valid request
    BadRequest,
    /// Already initialized
    AlreadyInitialized,
    /// Not initialized
    NotInitialized,
    /// Boot failed
    BootFailed,
    /// Transaction could not be logged
    TxFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "REL_CLI_CONFIG_ERROR",
            Self::IoError => "REL_CLI_IO_ERROR",
            Self::BadRequest => "REL_CLI_BAD_REQUEST",
            Self::AlreadyInitialized => "REL_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "REL_CLI_NOT_INITIALIZED",
            Self::BootFailed => "REL_CLI_BOOT_FAILED",
            Self::TxFailed => "REL_CLI_TX_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BadRequest, msg)
    }

    /// Already initialized
    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    /// Not initialized
    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'relplan init' first.",
        )
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if the serving loop can answer and continue
    pub fn is_recoverable(&self) -> bool {
        self.code == CliErrorCode::BadRequest
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ServerError> for CliError {
    fn from(e: ServerError) -> Self {
        match e.code() {
            ServerErrorCode::RelConfigInvalid => Self::config_error(e.to_string()),
            _ => Self::boot_failed(e.to_string()),
        }
    }
}

impl From<WalError> for CliError {
    fn from(e: WalError) -> Self {
        Self::new(CliErrorCode::TxFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
