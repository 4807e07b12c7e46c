//! Query description handed to query planners

use serde::{Deserialize, Serialize};

use crate::query::{Predicate, Term};

/// Tables, conjunctive predicate and projected fields of one query.
///
/// Table order matters: it seeds the left-deep join fold. Field names in
/// the predicate and projection are qualified (`table.field`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryData {
    pub tables: Vec<String>,
    #[serde(default)]
    pub predicate: Predicate,
    pub fields: Vec<String>,
}

impl QueryData {
    /// Creates a query over `tables` with an always-true predicate
    pub fn new(tables: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            predicate: Predicate::new(),
            fields: Vec::new(),
        }
    }

    /// Adds a term to the predicate
    pub fn with_term(mut self, term: Term) -> Self {
        self.predicate = self.predicate.with_term(term);
        self
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}
