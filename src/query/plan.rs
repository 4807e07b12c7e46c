//! Plan trait and shared plan types

use std::fmt;

use crate::planner::PlannerResult;
use crate::storage::Row;

use super::schema::Schema;

/// Lazy stream of rows produced by an opened plan
pub type RowStream<'a> = Box<dyn Iterator<Item = PlannerResult<Row>> + 'a>;

/// Operator variants of the plan algebra
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlanKind {
    TableScan,
    IndexScan,
    Select,
    Product,
    MergeJoin,
    Project,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::TableScan => "TableScan",
            PlanKind::IndexScan => "IndexScan",
            PlanKind::Select => "Select",
            PlanKind::Product => "Product",
            PlanKind::MergeJoin => "MergeJoin",
            PlanKind::Project => "Project",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of an executable operator tree.
///
/// Nodes own their children and are never mutated after construction.
/// `open` may be called any number of times; each call restarts the stream.
pub trait Plan: Send + Sync {
    fn kind(&self) -> PlanKind;

    /// Schema of the rows this node produces
    fn schema(&self) -> &Schema;

    fn open(&self) -> PlannerResult<RowStream<'_>>;

    /// Direct inputs, left to right
    fn children(&self) -> Vec<&dyn Plan>;

    /// Field the output is ordered on, if any
    fn sorted_on(&self) -> Option<&str> {
        None
    }

    /// One-line label for plan rendering
    fn describe(&self) -> String;
}

impl fmt::Debug for dyn Plan + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Opens `plan` and collects every row.
pub fn collect_rows(plan: &dyn Plan) -> PlannerResult<Vec<Row>> {
    plan.open()?.collect()
}
