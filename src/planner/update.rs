//! Update planning
//!
//! DDL and DML statements run directly against the catalog and heaps.
//! `IndexUpdatePlanner` keeps every index of a table in step with its heap
//! and registers undo actions on the transaction for each change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, IndexInfo};
use crate::index::CreateIndexData;
use crate::query::{Constant, FieldDef, Predicate, Schema};
use crate::tx::Transaction;

use super::errors::{PlannerError, PlannerResult};

/// CREATE TABLE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableData {
    pub table_name: String,
    pub fields: Vec<FieldDef>,
}

/// INSERT of one row; `fields` are unqualified and may be in any order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertData {
    pub table_name: String,
    pub fields: Vec<String>,
    pub values: Vec<Constant>,
}

/// DELETE; the predicate uses qualified names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteData {
    pub table_name: String,
    #[serde(default)]
    pub predicate: Predicate,
}

/// Executes updates, returning the number of affected rows
pub trait UpdatePlanner: Send + Sync {
    fn execute_create_table(&self, data: &CreateTableData, tx: &Transaction) -> PlannerResult<usize>;

    fn execute_create_index(&self, data: &CreateIndexData, tx: &Transaction) -> PlannerResult<usize>;

    fn execute_insert(&self, data: &InsertData, tx: &Transaction) -> PlannerResult<usize>;

    fn execute_delete(&self, data: &DeleteData, tx: &Transaction) -> PlannerResult<usize>;
}

pub struct IndexUpdatePlanner {
    catalog: Arc<Catalog>,
}

impl IndexUpdatePlanner {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

/// Orders insert values by the table schema and type-checks them
fn build_row(schema: &Schema, data: &InsertData) -> PlannerResult<Vec<Constant>> {
    if data.fields.len() != data.values.len() {
        return Err(PlannerError::type_mismatch(format!(
            "{} fields but {} values",
            data.fields.len(),
            data.values.len()
        )));
    }
    if let Some(unknown) = data.fields.iter().find(|f| !schema.has_field(f)) {
        return Err(PlannerError::unknown_field(format!(
            "{}.{}",
            data.table_name, unknown
        )));
    }
    if let Some((_, repeated)) = data
        .fields
        .iter()
        .enumerate()
        .find(|&(i, f)| data.fields[..i].contains(f))
    {
        return Err(PlannerError::duplicate_field(format!(
            "{}.{}",
            data.table_name, repeated
        )));
    }

    let mut row = Vec::with_capacity(schema.len());
    for def in schema.field_defs() {
        let value = data
            .fields
            .iter()
            .position(|f| *f == def.name)
            .map(|i| &data.values[i])
            .ok_or_else(|| {
                PlannerError::type_mismatch(format!("no value for field '{}'", def.name))
            })?;
        if !def.field_type.accepts(value) {
            return Err(PlannerError::type_mismatch(format!(
                "{} is not a valid {} for field '{}'",
                value,
                def.field_type.as_str(),
                def.name
            )));
        }
        row.push(value.clone());
    }
    Ok(row)
}

impl UpdatePlanner for IndexUpdatePlanner {
    fn execute_create_table(&self, data: &CreateTableData, tx: &Transaction) -> PlannerResult<usize> {
        let schema =
            Schema::from_defs(data.fields.iter().cloned()).map_err(PlannerError::duplicate_field)?;
        self.catalog.create_table(&data.table_name, schema, tx)?;
        Ok(0)
    }

    fn execute_create_index(&self, data: &CreateIndexData, tx: &Transaction) -> PlannerResult<usize> {
        self.catalog.create_index(data, tx)?;
        Ok(0)
    }

    fn execute_insert(&self, data: &InsertData, tx: &Transaction) -> PlannerResult<usize> {
        let table = self.catalog.table(&data.table_name)?;
        let row = build_row(table.schema(), data)?;

        let _pin = tx.buffers().pin(&data.table_name)?;
        let heap = Arc::clone(table.heap());
        let id = heap.insert(row.clone());
        let indexes = self.catalog.indexes_on(&data.table_name);
        for index in &indexes {
            index.insert_row(id, &row);
        }

        tx.on_rollback(Box::new(move || {
            for index in &indexes {
                index.remove_row(id, &row);
            }
            heap.delete(id);
        }));
        Ok(1)
    }

    fn execute_delete(&self, data: &DeleteData, tx: &Transaction) -> PlannerResult<usize> {
        let table = self.catalog.table(&data.table_name)?;
        let schema = table.schema().qualified(&data.table_name);
        if let Some(missing) = data.predicate.fields().find(|f| !schema.has_field(f)) {
            return Err(PlannerError::unknown_field(missing));
        }

        let _pin = tx.buffers().pin(&data.table_name)?;
        let heap = Arc::clone(table.heap());
        let indexes: Vec<Arc<IndexInfo>> = self.catalog.indexes_on(&data.table_name);

        let mut deleted = Vec::new();
        for (id, row) in heap.snapshot() {
            if data.predicate.is_satisfied(&schema, &row) && heap.delete(id).is_some() {
                for index in &indexes {
                    index.remove_row(id, &row);
                }
                deleted.push((id, row));
            }
        }

        let count = deleted.len();
        tx.on_rollback(Box::new(move || {
            for (id, row) in deleted {
                heap.restore(id, row.clone());
                for index in &indexes {
                    index.insert_row(id, &row);
                }
            }
        }));
        Ok(count)
    }
}
