//! Heuristic strategy
//!
//! No statistics. Single-table terms are pushed into a filter over each
//! scan. The seed is the first table restricted by a `field = constant`
//! term, otherwise the first table. Then, repeatedly, the first remaining
//! table sharing a join term with the accumulated plan is attached as a
//! filtered product; if none shares a term, the first remaining table is
//! attached with a plain product.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::query::{Plan, Predicate, ProductPlan, ProjectPlan, SelectPlan, TablePlan};
use crate::tx::Transaction;

use super::errors::{PlannerError, PlannerResult};
use super::kind::PlannerKind;
use super::query_data::QueryData;
use super::query_planner::QueryPlanner;

pub struct HeuristicQueryPlanner {
    catalog: Arc<Catalog>,
}

impl HeuristicQueryPlanner {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn restricted_scan(
        &self,
        table: &str,
        predicate: &Predicate,
        tx: &Transaction,
    ) -> PlannerResult<Box<dyn Plan>> {
        let scan = TablePlan::new(table, tx, &self.catalog)?;
        Ok(match predicate.select_sub_pred(scan.schema()) {
            Some(sub) => Box::new(SelectPlan::new(Box::new(scan), sub)?),
            None => Box::new(scan),
        })
    }
}

fn has_constant_term(plan: &dyn Plan, predicate: &Predicate) -> bool {
    plan.schema()
        .fields()
        .any(|f| predicate.equates_with_constant(f).is_some())
}

impl QueryPlanner for HeuristicQueryPlanner {
    fn create_plan(&self, data: &QueryData, tx: &Transaction) -> PlannerResult<Box<dyn Plan>> {
        let predicate = data.predicate();
        let mut remaining = data
            .tables()
            .iter()
            .map(|table| self.restricted_scan(table, predicate, tx))
            .collect::<PlannerResult<Vec<_>>>()?;
        if remaining.is_empty() {
            return Err(PlannerError::query_empty());
        }

        let seed = remaining
            .iter()
            .position(|p| has_constant_term(p.as_ref(), predicate))
            .unwrap_or(0);
        let mut accumulated = remaining.remove(seed);

        while !remaining.is_empty() {
            let joinable = remaining.iter().enumerate().find_map(|(i, p)| {
                predicate
                    .join_sub_pred(accumulated.schema(), p.schema())
                    .map(|join| (i, join))
            });
            accumulated = match joinable {
                Some((i, join)) => {
                    let product = ProductPlan::new(accumulated, remaining.remove(i))?;
                    Box::new(SelectPlan::new(Box::new(product), join)?)
                }
                None => Box::new(ProductPlan::new(accumulated, remaining.remove(0))?),
            };
        }

        // every term is applied once both of its sides are present
        if let Some(missing) = predicate
            .fields()
            .find(|f| !accumulated.schema().has_field(f))
        {
            return Err(PlannerError::unknown_field(missing));
        }

        Ok(Box::new(ProjectPlan::new(accumulated, data.fields())?))
    }

    fn kind(&self) -> PlannerKind {
        PlannerKind::Heuristic
    }
}
