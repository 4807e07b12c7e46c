//! Filter plan

use crate::planner::{PlannerError, PlannerResult};

use super::plan::{Plan, PlanKind, RowStream};
use super::predicate::Predicate;
use super::schema::Schema;

/// Yields the input rows that satisfy every term of the predicate.
///
/// Preserves input order; an empty predicate passes every row.
pub struct SelectPlan {
    input: Box<dyn Plan>,
    predicate: Predicate,
}

impl SelectPlan {
    pub fn new(input: Box<dyn Plan>, predicate: Predicate) -> PlannerResult<Self> {
        if let Some(missing) = predicate.fields().find(|f| !input.schema().has_field(f)) {
            return Err(PlannerError::unknown_field(missing));
        }
        Ok(Self { input, predicate })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Plan for SelectPlan {
    fn kind(&self) -> PlanKind {
        PlanKind::Select
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn open(&self) -> PlannerResult<RowStream<'_>> {
        let schema = self.input.schema();
        let predicate = &self.predicate;
        let rows = self.input.open()?.filter(move |row| match row {
            Ok(row) => predicate.is_satisfied(schema, row),
            Err(_) => true,
        });
        Ok(Box::new(rows))
    }

    fn children(&self) -> Vec<&dyn Plan> {
        vec![self.input.as_ref()]
    }

    fn sorted_on(&self) -> Option<&str> {
        self.input.sorted_on()
    }

    fn describe(&self) -> String {
        format!("Select {}", self.predicate)
    }
}
