//! Query planner strategy interface

use crate::query::Plan;
use crate::tx::Transaction;

use super::errors::PlannerResult;
use super::kind::PlannerKind;
use super::query_data::QueryData;

/// Builds an executable plan for a query.
///
/// Every strategy returns a plan whose schema is exactly `data.fields` in
/// order and whose rows are the conjunctive evaluation of the query over
/// the listed tables. Strategies differ only in join order, join method,
/// and use of existing orderings. An empty table list is rejected with
/// `REL_QUERY_EMPTY`. The transaction is passed through, never committed.
pub trait QueryPlanner: Send + Sync {
    fn create_plan(&self, data: &QueryData, tx: &Transaction) -> PlannerResult<Box<dyn Plan>>;

    fn kind(&self) -> PlannerKind;
}
