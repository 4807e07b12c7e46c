//! Exploit-sort strategy
//!
//! Same fold as the sort strategy, but a candidate whose join field has a
//! B-tree index is scanned in index order, so the merge join does not sort
//! it again.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::observability::DiagnosticSink;
use crate::query::Plan;
use crate::tx::Transaction;

use super::errors::PlannerResult;
use super::join_order::JoinOrderBuilder;
use super::kind::PlannerKind;
use super::query_data::QueryData;
use super::query_planner::QueryPlanner;

pub struct ExploitSortQueryPlanner {
    builder: JoinOrderBuilder,
}

impl ExploitSortQueryPlanner {
    pub fn new(catalog: Arc<Catalog>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            builder: JoinOrderBuilder::new(catalog, sink).with_index_order(),
        }
    }
}

impl QueryPlanner for ExploitSortQueryPlanner {
    fn create_plan(&self, data: &QueryData, tx: &Transaction) -> PlannerResult<Box<dyn Plan>> {
        self.builder.build(data, tx)
    }

    fn kind(&self) -> PlannerKind {
        PlannerKind::ExploitSort
    }
}
