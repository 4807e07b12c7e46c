//! Strategy selection
//!
//! The set of query planner strategies is closed. Configuration keys map to
//! strategies through `STRATEGY_TABLE`; adding a strategy means adding one
//! variant and one table entry.

use std::fmt;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::observability::{emit, DiagnosticRecord, DiagnosticSink, Event};

use super::basic::BasicQueryPlanner;
use super::exploit_sort::ExploitSortQueryPlanner;
use super::heuristic::HeuristicQueryPlanner;
use super::query_planner::QueryPlanner;
use super::sort::SortQueryPlanner;

/// Query planner strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlannerKind {
    /// Cross products in list order, one filter
    Basic,
    /// Selections pushed down, joins ordered by shared terms
    Heuristic,
    /// Left-deep merge-join fold
    Sort,
    /// Merge-join fold that scans indexed join fields in order
    ExploitSort,
}

/// Configuration key to strategy
pub const STRATEGY_TABLE: [(&str, PlannerKind); 4] = [
    ("", PlannerKind::Basic),
    ("heuristic", PlannerKind::Heuristic),
    ("sort", PlannerKind::Sort),
    ("smart", PlannerKind::ExploitSort),
];

impl PlannerKind {
    /// Strategy used for unrecognized keys
    pub const DEFAULT: PlannerKind = PlannerKind::Basic;

    /// Exact table lookup
    pub fn lookup(key: &str) -> Option<PlannerKind> {
        STRATEGY_TABLE
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, kind)| *kind)
    }

    /// Resolves a configuration key.
    ///
    /// Unrecognized keys resolve to `DEFAULT` and record a
    /// `PLANNER_KEY_UNRECOGNIZED` warning on `sink`.
    pub fn resolve(key: &str, sink: &dyn DiagnosticSink) -> PlannerKind {
        match Self::lookup(key) {
            Some(kind) => kind,
            None => {
                emit(
                    sink,
                    DiagnosticRecord::new(Event::PlannerKeyUnrecognized)
                        .with_field("key", key)
                        .with_field("fallback", Self::DEFAULT),
                );
                Self::DEFAULT
            }
        }
    }

    /// The configuration key for this strategy
    pub fn key(&self) -> &'static str {
        STRATEGY_TABLE
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(k, _)| *k)
            .unwrap_or("")
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlannerKind::Basic => "basic",
            PlannerKind::Heuristic => "heuristic",
            PlannerKind::Sort => "sort",
            PlannerKind::ExploitSort => "exploit_sort",
        }
    }

    /// Instantiates the strategy
    pub fn build(
        &self,
        catalog: Arc<Catalog>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Box<dyn QueryPlanner> {
        match self {
            PlannerKind::Basic => Box::new(BasicQueryPlanner::new(catalog)),
            PlannerKind::Heuristic => Box::new(HeuristicQueryPlanner::new(catalog)),
            PlannerKind::Sort => Box::new(SortQueryPlanner::new(catalog, sink)),
            PlannerKind::ExploitSort => Box::new(ExploitSortQueryPlanner::new(catalog, sink)),
        }
    }
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
