//! Query values and the plan algebra
//!
//! Leaves first: constants, schemas and predicates, then the operator
//! nodes that planners assemble into trees.
//!
//! # Plan nodes
//!
//! - `TablePlan`: heap scan, optionally in B-tree key order
//! - `SelectPlan`: filter on a conjunctive predicate
//! - `ProductPlan`: cross product
//! - `MergeJoinPlan`: sort-merge equi-join
//! - `ProjectPlan`: field restriction and reordering

mod constant;
mod merge_join_plan;
mod plan;
mod predicate;
mod product_plan;
mod project_plan;
mod schema;
mod select_plan;
mod table_plan;

pub use constant::Constant;
pub use merge_join_plan::MergeJoinPlan;
pub use plan::{collect_rows, Plan, PlanKind, RowStream};
pub use predicate::{Expression, Predicate, Term};
pub use product_plan::ProductPlan;
pub use project_plan::ProjectPlan;
pub use schema::{FieldDef, FieldType, Schema};
pub use select_plan::SelectPlan;
pub use table_plan::TablePlan;
