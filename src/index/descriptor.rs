//! DDL index descriptor
//!
//! Carries a parsed CREATE INDEX from the request layer to the catalog.
//! The descriptor validates nothing; whether the field belongs to the
//! table is the catalog's decision.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical organization of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Ordered tree; supports ordered scans
    BTree,
    /// Hash buckets; equality lookups only
    Hash,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::BTree => "btree",
            IndexType::Hash => "hash",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of an index to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexData {
    index_name: String,
    table_name: String,
    field_name: String,
    index_type: IndexType,
}

impl CreateIndexData {
    pub fn new(
        index_name: impl Into<String>,
        table_name: impl Into<String>,
        field_name: impl Into<String>,
        index_type: IndexType,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            table_name: table_name.into(),
            field_name: field_name.into(),
            index_type,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_return_constructor_values() {
        let data = CreateIndexData::new("idx_b", "enroll", "sid", IndexType::Hash);

        assert_eq!(data.index_name(), "idx_b");
        assert_eq!(data.table_name(), "enroll");
        assert_eq!(data.field_name(), "sid");
        assert_eq!(data.index_type(), IndexType::Hash);

        // reads do not disturb the value
        let copy = data.clone();
        let _ = data.index_name();
        assert_eq!(data, copy);
    }

    #[test]
    fn test_index_type_json_names() {
        let data: CreateIndexData = serde_json::from_str(
            r#"{"index_name":"i","table_name":"t","field_name":"f","index_type":"btree"}"#,
        )
        .unwrap();
        assert_eq!(data.index_type(), IndexType::BTree);
        assert_eq!(serde_json::to_string(&IndexType::Hash).unwrap(), "\"hash\"");
    }
}
