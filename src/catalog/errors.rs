//! Catalog error types

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while reading or changing table and index definitions
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown field '{field}' in table '{table}'")]
    UnknownField { table: String, field: String },

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Index already exists: {0}")]
    IndexExists(String),

    #[error("Duplicate field '{field}' in table '{table}'")]
    DuplicateField { table: String, field: String },

    #[error("Table '{0}' must declare at least one field")]
    NoFields(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
