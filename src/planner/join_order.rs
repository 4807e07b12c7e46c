//! Left-deep join-order builder
//!
//! Folds the query's tables, in list order, into a left-deep tree. Each
//! step searches for a join key between the accumulated plan and the next
//! table and merge-joins on it, falling back to a cross product. The result
//! is always filtered on the full predicate and then projected.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::observability::{emit, DiagnosticRecord, DiagnosticSink, Event};
use crate::query::{
    MergeJoinPlan, Plan, Predicate, ProductPlan, ProjectPlan, Schema, SelectPlan, TablePlan,
};
use crate::tx::Transaction;

use super::errors::{PlannerError, PlannerResult};
use super::query_data::QueryData;

/// Field pair an equi-join is keyed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKey {
    /// Field of the accumulated plan
    pub left_field: String,
    /// Field of the candidate table
    pub right_field: String,
}

/// Finds the join key between the accumulated plan and a candidate.
///
/// Walks `accumulated` in schema order and returns the first field that
/// some term equates with a field of `candidate`. Later qualifying pairs
/// are never considered.
pub fn find_join_key(
    accumulated: &Schema,
    predicate: &Predicate,
    candidate: &Schema,
) -> Option<JoinKey> {
    accumulated.fields().find_map(|field| {
        predicate
            .terms()
            .iter()
            .filter_map(|term| term.equates_with_field(field))
            .find(|other| candidate.has_field(other))
            .map(|other| JoinKey {
                left_field: field.to_string(),
                right_field: other.to_string(),
            })
    })
}

/// Combines two plans according to the key search result.
///
/// A key yields a merge join and one `MERGE_JOIN_CREATED` record; no key
/// yields a cross product and no record.
pub fn assemble_join(
    accumulated: Box<dyn Plan>,
    candidate: Box<dyn Plan>,
    key: Option<&JoinKey>,
    tx: &Transaction,
    sink: &dyn DiagnosticSink,
) -> PlannerResult<Box<dyn Plan>> {
    match key {
        Some(key) => {
            let plan =
                MergeJoinPlan::new(accumulated, candidate, &key.left_field, &key.right_field, tx)?;
            emit(
                sink,
                DiagnosticRecord::new(Event::MergeJoinCreated)
                    .with_field("left_field", &key.left_field)
                    .with_field("right_field", &key.right_field)
                    .with_field("tx_id", tx.id()),
            );
            Ok(Box::new(plan))
        }
        None => Ok(Box::new(ProductPlan::new(accumulated, candidate)?)),
    }
}

/// Wraps a joined plan in a filter on the full predicate and a projection.
pub fn filter_and_project(plan: Box<dyn Plan>, data: &QueryData) -> PlannerResult<Box<dyn Plan>> {
    let filtered = SelectPlan::new(plan, data.predicate().clone())?;
    Ok(Box::new(ProjectPlan::new(Box::new(filtered), data.fields())?))
}

/// The merge-join fold over a catalog.
pub struct JoinOrderBuilder {
    catalog: Arc<Catalog>,
    sink: Arc<dyn DiagnosticSink>,
    use_index_order: bool,
}

impl JoinOrderBuilder {
    pub fn new(catalog: Arc<Catalog>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            catalog,
            sink,
            use_index_order: false,
        }
    }

    /// Scan a candidate in B-tree order when its join field is indexed.
    pub fn with_index_order(mut self) -> Self {
        self.use_index_order = true;
        self
    }

    pub fn build(&self, data: &QueryData, tx: &Transaction) -> PlannerResult<Box<dyn Plan>> {
        let scans = data
            .tables()
            .iter()
            .map(|table| TablePlan::new(table, tx, &self.catalog))
            .collect::<PlannerResult<Vec<_>>>()?;

        let mut scans = scans.into_iter();
        let mut accumulated: Box<dyn Plan> = match scans.next() {
            Some(first) => Box::new(first),
            None => return Err(PlannerError::query_empty()),
        };

        for scan in scans {
            let key = find_join_key(accumulated.schema(), data.predicate(), scan.schema());
            let candidate = match &key {
                Some(key) if self.use_index_order => {
                    self.ordered_scan(scan.table(), key, tx)?.unwrap_or(scan)
                }
                _ => scan,
            };
            accumulated = assemble_join(
                accumulated,
                Box::new(candidate),
                key.as_ref(),
                tx,
                self.sink.as_ref(),
            )?;
        }

        filter_and_project(accumulated, data)
    }

    fn ordered_scan(
        &self,
        table: &str,
        key: &JoinKey,
        tx: &Transaction,
    ) -> PlannerResult<Option<TablePlan>> {
        let prefix = format!("{}.", table);
        let field = match key.right_field.strip_prefix(&prefix) {
            Some(field) => field,
            None => return Ok(None),
        };
        if self.catalog.btree_index(table, field).is_none() {
            return Ok(None);
        }
        TablePlan::ordered_by(table, field, tx, &self.catalog).map(Some)
    }
}
