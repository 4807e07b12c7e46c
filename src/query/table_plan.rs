//! Table scans
//!
//! A table plan reads one heap. The plain scan yields rows in slot order;
//! the index-ordered scan walks a B-tree index so rows come out sorted on
//! the indexed field. Both pin the table's buffer for as long as the stream
//! is alive.

use std::sync::Arc;

use crate::buffer::{BufferManager, BufferPin};
use crate::catalog::{Catalog, IndexInfo};
use crate::planner::{PlannerError, PlannerResult};
use crate::storage::{Row, TableHeap};
use crate::tx::Transaction;

use super::plan::{Plan, PlanKind, RowStream};
use super::schema::Schema;

struct IndexOrder {
    field: String,
    index: Arc<IndexInfo>,
}

/// Scan of a stored table; fields are exposed as `<table>.<field>`
pub struct TablePlan {
    table: String,
    schema: Schema,
    heap: Arc<TableHeap>,
    buffers: Arc<BufferManager>,
    order: Option<IndexOrder>,
}

impl TablePlan {
    pub fn new(table: &str, tx: &Transaction, catalog: &Catalog) -> PlannerResult<Self> {
        let info = catalog.table(table)?;
        Ok(Self {
            table: table.to_string(),
            schema: info.schema().qualified(table),
            heap: Arc::clone(info.heap()),
            buffers: Arc::clone(tx.buffers()),
            order: None,
        })
    }

    /// Scan emitting rows in key order of `field` (unqualified).
    ///
    /// Requires a B-tree index on that field.
    pub fn ordered_by(
        table: &str,
        field: &str,
        tx: &Transaction,
        catalog: &Catalog,
    ) -> PlannerResult<Self> {
        let mut plan = Self::new(table, tx, catalog)?;
        let index = catalog
            .btree_index(table, field)
            .ok_or_else(|| PlannerError::index_required(table, field))?;
        plan.order = Some(IndexOrder {
            field: format!("{}.{}", table, field),
            index,
        });
        Ok(plan)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Plan for TablePlan {
    fn kind(&self) -> PlanKind {
        match self.order {
            Some(_) => PlanKind::IndexScan,
            None => PlanKind::TableScan,
        }
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open(&self) -> PlannerResult<RowStream<'_>> {
        let pin = self.buffers.pin(&self.table)?;
        let rows: Vec<Row> = match &self.order {
            None => self.heap.snapshot().into_iter().map(|(_, row)| row).collect(),
            Some(order) => order
                .index
                .ordered_rows()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|id| self.heap.get(id))
                .collect(),
        };
        Ok(Box::new(ScanStream {
            _pin: pin,
            rows: rows.into_iter(),
        }))
    }

    fn children(&self) -> Vec<&dyn Plan> {
        Vec::new()
    }

    fn sorted_on(&self) -> Option<&str> {
        self.order.as_ref().map(|o| o.field.as_str())
    }

    fn describe(&self) -> String {
        match &self.order {
            Some(order) => format!("IndexScan {} ON {}", self.table, order.field),
            None => format!("TableScan {}", self.table),
        }
    }
}

struct ScanStream {
    _pin: BufferPin,
    rows: std::vec::IntoIter<Row>,
}

impl Iterator for ScanStream {
    type Item = PlannerResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(Ok)
    }
}
