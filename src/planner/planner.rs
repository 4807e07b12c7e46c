//! Composed planner: one query strategy plus the update planner

use serde::{Deserialize, Serialize};

use crate::index::CreateIndexData;
use crate::query::Plan;
use crate::tx::Transaction;

use super::errors::PlannerResult;
use super::kind::PlannerKind;
use super::query_data::QueryData;
use super::query_planner::QueryPlanner;
use super::update::{CreateTableData, DeleteData, InsertData, UpdatePlanner};

/// An update statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateCommand {
    CreateTable(CreateTableData),
    CreateIndex(CreateIndexData),
    Insert(InsertData),
    Delete(DeleteData),
}

pub struct Planner {
    query_planner: Box<dyn QueryPlanner>,
    update_planner: Box<dyn UpdatePlanner>,
}

impl Planner {
    pub fn new(query_planner: Box<dyn QueryPlanner>, update_planner: Box<dyn UpdatePlanner>) -> Self {
        Self {
            query_planner,
            update_planner,
        }
    }

    /// Strategy this planner was composed with
    pub fn kind(&self) -> PlannerKind {
        self.query_planner.kind()
    }

    pub fn create_query_plan(
        &self,
        data: &QueryData,
        tx: &Transaction,
    ) -> PlannerResult<Box<dyn Plan>> {
        self.query_planner.create_plan(data, tx)
    }

    /// Runs an update, returning the number of affected rows
    pub fn execute_update(&self, command: &UpdateCommand, tx: &Transaction) -> PlannerResult<usize> {
        match command {
            UpdateCommand::CreateTable(data) => self.update_planner.execute_create_table(data, tx),
            UpdateCommand::CreateIndex(data) => self.update_planner.execute_create_index(data, tx),
            UpdateCommand::Insert(data) => self.update_planner.execute_insert(data, tx),
            UpdateCommand::Delete(data) => self.update_planner.execute_delete(data, tx),
        }
    }
}
