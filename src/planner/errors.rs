//! Planner error types
//!
//! Error codes:
//! - REL_QUERY_EMPTY (REJECT)
//! - REL_UNKNOWN_TABLE (REJECT)
//! - REL_UNKNOWN_FIELD (REJECT)
//! - REL_DUPLICATE_FIELD (REJECT)
//! - REL_INDEX_REQUIRED (REJECT)
//! - REL_TYPE_MISMATCH (REJECT)
//! - REL_CATALOG_REJECTED (REJECT)
//! - REL_BUFFER_ABORT (ABORT)

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected, nothing was changed
    Reject,
    /// Request could not complete with the resources available; retryable by the caller
    Abort,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Abort => write!(f, "ABORT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Query names no tables
    RelQueryEmpty,
    /// Table not present in the catalog
    RelUnknownTable,
    /// Field not present in the plan's input schema
    RelUnknownField,
    /// Two inputs of a join expose the same field name
    RelDuplicateField,
    /// Ordered scan requested on a field without a B-tree index
    RelIndexRequired,
    /// Value does not match the declared field type, or wrong arity
    RelTypeMismatch,
    /// Catalog refused a definition (duplicate table or index, ...)
    RelCatalogRejected,
    /// No free buffer slot for a scan
    RelBufferAbort,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::RelQueryEmpty => "REL_QUERY_EMPTY",
            PlannerErrorCode::RelUnknownTable => "REL_UNKNOWN_TABLE",
            PlannerErrorCode::RelUnknownField => "REL_UNKNOWN_FIELD",
            PlannerErrorCode::RelDuplicateField => "REL_DUPLICATE_FIELD",
            PlannerErrorCode::RelIndexRequired => "REL_INDEX_REQUIRED",
            PlannerErrorCode::RelTypeMismatch => "REL_TYPE_MISMATCH",
            PlannerErrorCode::RelCatalogRejected => "REL_CATALOG_REJECTED",
            PlannerErrorCode::RelBufferAbort => "REL_BUFFER_ABORT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            PlannerErrorCode::RelBufferAbort => Severity::Abort,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Offending table or field name, if applicable
    subject: Option<String>,
}

impl PlannerError {
    /// Create an empty table list error
    pub fn query_empty() -> Self {
        Self {
            code: PlannerErrorCode::RelQueryEmpty,
            message: "Query must name at least one table".into(),
            subject: None,
        }
    }

    /// Create an unknown table error
    pub fn unknown_table(table: impl Into<String>) -> Self {
        let t = table.into();
        Self {
            code: PlannerErrorCode::RelUnknownTable,
            message: format!("Table '{}' does not exist", t),
            subject: Some(t),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: PlannerErrorCode::RelUnknownField,
            message: format!("Field '{}' is not in the input schema", f),
            subject: Some(f),
        }
    }

    /// Create a duplicate field error
    pub fn duplicate_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: PlannerErrorCode::RelDuplicateField,
            message: format!("Field '{}' is declared more than once", f),
            subject: Some(f),
        }
    }

    /// Create an index required error
    pub fn index_required(table: &str, field: &str) -> Self {
        Self {
            code: PlannerErrorCode::RelIndexRequired,
            message: format!("No btree index on '{}.{}'", table, field),
            subject: Some(format!("{}.{}", table, field)),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::RelTypeMismatch,
            message: reason.into(),
            subject: None,
        }
    }

    /// Create a catalog rejection error
    pub fn catalog_rejected(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::RelCatalogRejected,
            message: reason.into(),
            subject: None,
        }
    }

    /// Create a buffer abort error
    pub fn buffer_abort(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::RelBufferAbort,
            message: reason.into(),
            subject: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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

    /// Returns the offending table or field name, if applicable
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for PlannerError {}

impl From<crate::catalog::CatalogError> for PlannerError {
    fn from(e: crate::catalog::CatalogError) -> Self {
        use crate::catalog::CatalogError;
        match e {
            CatalogError::UnknownTable(t) => PlannerError::unknown_table(t),
            CatalogError::UnknownField { table, field } => {
                PlannerError::unknown_field(format!("{}.{}", table, field))
            }
            other => PlannerError::catalog_rejected(other.to_string()),
        }
    }
}

impl From<crate::buffer::BufferError> for PlannerError {
    fn from(e: crate::buffer::BufferError) -> Self {
        PlannerError::buffer_abort(e.to_string())
    }
}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
