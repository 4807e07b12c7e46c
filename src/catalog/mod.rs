//! Catalog subsystem
//!
//! Holds table and index definitions. Field names are stored unqualified;
//! plans qualify them with the table name.

mod manager;
mod errors;

pub use manager::{Catalog, IndexInfo, TableInfo, INDEX_CATALOG, TABLE_CATALOG};
pub use errors::{CatalogError, CatalogResult};
