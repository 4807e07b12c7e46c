//! Cross-product plan

use std::iter;

use crate::planner::{PlannerError, PlannerResult};

use super::plan::{Plan, PlanKind, RowStream};
use super::schema::Schema;

/// Pairs every left row with every right row.
///
/// The right input is reopened once per left row.
pub struct ProductPlan {
    left: Box<dyn Plan>,
    right: Box<dyn Plan>,
    schema: Schema,
}

impl ProductPlan {
    pub fn new(left: Box<dyn Plan>, right: Box<dyn Plan>) -> PlannerResult<Self> {
        let schema =
            Schema::concat(left.schema(), right.schema()).map_err(PlannerError::duplicate_field)?;
        Ok(Self {
            left,
            right,
            schema,
        })
    }
}

impl Plan for ProductPlan {
    fn kind(&self) -> PlanKind {
        PlanKind::Product
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open<'a>(&'a self) -> PlannerResult<RowStream<'a>> {
        let right = self.right.as_ref();
        let rows = self.left.open()?.flat_map(move |left| -> RowStream<'a> {
            let left = match left {
                Ok(row) => row,
                Err(e) => return Box::new(iter::once(Err(e))),
            };
            match right.open() {
                Ok(stream) => Box::new(stream.map(move |r| {
                    r.map(|r| {
                        let mut row = left.clone();
                        row.extend(r);
                        row
                    })
                })),
                Err(e) => Box::new(iter::once(Err(e))),
            }
        });
        Ok(Box::new(rows))
    }

    fn children(&self) -> Vec<&dyn Plan> {
        vec![self.left.as_ref(), self.right.as_ref()]
    }

    fn describe(&self) -> String {
        "Product".to_string()
    }
}
