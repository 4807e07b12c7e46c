//! Basic strategy: products in list order, then one filter

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::query::{Plan, ProductPlan, TablePlan};
use crate::tx::Transaction;

use super::errors::{PlannerError, PlannerResult};
use super::join_order::filter_and_project;
use super::kind::PlannerKind;
use super::query_data::QueryData;
use super::query_planner::QueryPlanner;

pub struct BasicQueryPlanner {
    catalog: Arc<Catalog>,
}

impl BasicQueryPlanner {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl QueryPlanner for BasicQueryPlanner {
    fn create_plan(&self, data: &QueryData, tx: &Transaction) -> PlannerResult<Box<dyn Plan>> {
        let mut plan: Option<Box<dyn Plan>> = None;
        for table in data.tables() {
            let scan: Box<dyn Plan> = Box::new(TablePlan::new(table, tx, &self.catalog)?);
            plan = Some(match plan {
                Some(left) => Box::new(ProductPlan::new(left, scan)?),
                None => scan,
            });
        }

        let plan = plan.ok_or_else(PlannerError::query_empty)?;
        filter_and_project(plan, data)
    }

    fn kind(&self) -> PlannerKind {
        PlannerKind::Basic
    }
}
