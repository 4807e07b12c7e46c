//! Sort strategy: the left-deep merge-join fold

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

pub struct SortQueryPlanner {
    builder: JoinOrderBuilder,
}

impl SortQueryPlanner {
    pub fn new(catalog: Arc<Catalog>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            builder: JoinOrderBuilder::new(catalog, sink),
        }
    }
}

impl QueryPlanner for SortQueryPlanner {
    fn create_plan(&self, data: &QueryData, tx: &Transaction) -> PlannerResult<Box<dyn Plan>> {
        self.builder.build(data, tx)
    }

    fn kind(&self) -> PlannerKind {
        PlannerKind::Sort
    }
}
