//! Projection plan

use crate::planner::{PlannerError, PlannerResult};
use crate::storage::Row;

use super::plan::{Plan, PlanKind, RowStream};
use super::schema::Schema;

/// Restricts rows to the requested fields, in the requested order
pub struct ProjectPlan {
    input: Box<dyn Plan>,
    schema: Schema,
    positions: Vec<usize>,
}

impl ProjectPlan {
    pub fn new(input: Box<dyn Plan>, fields: &[String]) -> PlannerResult<Self> {
        let mut defs = Vec::with_capacity(fields.len());
        let mut positions = Vec::with_capacity(fields.len());
        for field in fields {
            let pos = input
                .schema()
                .index_of(field)
                .ok_or_else(|| PlannerError::unknown_field(field.as_str()))?;
            defs.push(input.schema().field_defs()[pos].clone());
            positions.push(pos);
        }
        let schema = Schema::from_defs(defs).map_err(PlannerError::duplicate_field)?;

        Ok(Self {
            input,
            schema,
            positions,
        })
    }
}

impl Plan for ProjectPlan {
    fn kind(&self) -> PlanKind {
        PlanKind::Project
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open(&self) -> PlannerResult<RowStream<'_>> {
        let positions = &self.positions;
        let rows = self
            .input
            .open()?
            .map(move |row| row.map(|row| positions.iter().map(|p| row[*p].clone()).collect::<Row>()));
        Ok(Box::new(rows))
    }

    fn children(&self) -> Vec<&dyn Plan> {
        vec![self.input.as_ref()]
    }

    fn sorted_on(&self) -> Option<&str> {
        self.input
            .sorted_on()
            .filter(|field| self.schema.has_field(field))
    }

    fn describe(&self) -> String {
        format!("Project {}", self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::plan::collect_rows;
    use crate::query::plan::fixtures::RowsPlan;
    use crate::query::{Constant, ProductPlan};

    fn pairs() -> Box<dyn Plan> {
        Box::new(
            ProductPlan::new(
                Box::new(RowsPlan::new("a.x", &[1])),
                Box::new(RowsPlan::new("b.y", &[5, 6])),
            )
            .unwrap(),
        )
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_requested_order() {
        let project = ProjectPlan::new(pairs(), &fields(&["b.y", "a.x"])).unwrap();

        assert_eq!(project.schema().fields().collect::<Vec<_>>(), vec!["b.y", "a.x"]);
        assert_eq!(
            collect_rows(&project).unwrap(),
            vec![
                vec![Constant::int(5), Constant::int(1)],
                vec![Constant::int(6), Constant::int(1)]
            ]
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ProjectPlan::new(pairs(), &fields(&["a.x", "c.z"])).err().unwrap();
        assert_eq!(err.code().code(), "REL_UNKNOWN_FIELD");
    }

    #[test]
    fn test_order_dropped_with_its_field() {
        let input = Box::new(RowsPlan::new("a.x", &[1, 2]).claiming_order());
        let kept = ProjectPlan::new(input, &fields(&["a.x"])).unwrap();
        assert_eq!(kept.sorted_on(), Some("a.x"));

        let input = Box::new(RowsPlan::new("a.x", &[1, 2]).claiming_order());
        let emptied = ProjectPlan::new(input, &[]).unwrap();
        assert_eq!(emptied.sorted_on(), None);
        assert_eq!(collect_rows(&emptied).unwrap(), vec![Vec::<Constant>::new(); 2]);
    }
}
