//! Query and update planning for relplan
//!
//! A `Planner` pairs one query planner strategy with the index-aware
//! update planner. Strategies are chosen by `PlannerKind`.
//!
//! # Design Principles
//!
//! - Deterministic: same catalog and query produce the same tree
//! - Left-deep: joins fold tables in list order
//! - Explicit: an empty table list is an error, an unknown strategy key is
//!   a recorded fallback
//!
//! # Join method per step (sort strategies)
//!
//! 1. First accumulated field equated to a candidate field: merge join
//! 2. Otherwise: cross product
//!
//! The full predicate is applied once more above the last join.

mod basic;
mod errors;
mod exploit_sort;
mod explain;
mod heuristic;
mod join_order;
mod kind;
mod planner;
mod query_data;
mod query_planner;
mod sort;
mod update;

pub use basic::BasicQueryPlanner;
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use exploit_sort::ExploitSortQueryPlanner;
pub use explain::ExplainPlan;
pub use heuristic::HeuristicQueryPlanner;
pub use join_order::{assemble_join, filter_and_project, find_join_key, JoinKey, JoinOrderBuilder};
pub use kind::{PlannerKind, STRATEGY_TABLE};
pub use planner::{Planner, UpdateCommand};
pub use query_data::QueryData;
pub use query_planner::QueryPlanner;
pub use sort::SortQueryPlanner;
pub use update::{CreateTableData, DeleteData, IndexUpdatePlanner, InsertData, UpdatePlanner};
