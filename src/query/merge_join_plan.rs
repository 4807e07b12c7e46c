//! Sort-merge equi-join plan
//!
//! Each input is materialized and sorted on its join field, unless it
//! already reports that order. Equal-key groups are then merged. Output is
//! ordered on the left join field.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::buffer::BufferManager;
use crate::planner::{PlannerError, PlannerResult};
use crate::storage::Row;
use crate::tx::Transaction;

use super::plan::{collect_rows, Plan, PlanKind, RowStream};
use super::schema::Schema;

pub struct MergeJoinPlan {
    left: Box<dyn Plan>,
    right: Box<dyn Plan>,
    left_field: String,
    right_field: String,
    schema: Schema,
    buffers: Arc<BufferManager>,
}

impl MergeJoinPlan {
    pub fn new(
        left: Box<dyn Plan>,
        right: Box<dyn Plan>,
        left_field: &str,
        right_field: &str,
        tx: &Transaction,
    ) -> PlannerResult<Self> {
        if !left.schema().has_field(left_field) {
            return Err(PlannerError::unknown_field(left_field));
        }
        if !right.schema().has_field(right_field) {
            return Err(PlannerError::unknown_field(right_field));
        }
        let schema =
            Schema::concat(left.schema(), right.schema()).map_err(PlannerError::duplicate_field)?;

        Ok(Self {
            left,
            right,
            left_field: left_field.to_string(),
            right_field: right_field.to_string(),
            schema,
            buffers: Arc::clone(tx.buffers()),
        })
    }

    pub fn left_field(&self) -> &str {
        &self.left_field
    }

    pub fn right_field(&self) -> &str {
        &self.right_field
    }

    /// Materializes `plan`, sorting on `field` unless already ordered on it.
    fn sorted_input(&self, plan: &dyn Plan, field: &str) -> PlannerResult<(Vec<Row>, usize)> {
        let pos = plan
            .schema()
            .index_of(field)
            .ok_or_else(|| PlannerError::unknown_field(field))?;
        let mut rows = collect_rows(plan)?;
        if plan.sorted_on() != Some(field) {
            let _temp = self.buffers.pin(&format!("sort:{}", field))?;
            rows.sort_by(|a, b| a[pos].cmp(&b[pos]));
        }
        Ok((rows, pos))
    }
}

impl Plan for MergeJoinPlan {
    fn kind(&self) -> PlanKind {
        PlanKind::MergeJoin
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open(&self) -> PlannerResult<RowStream<'_>> {
        let (left, lpos) = self.sorted_input(self.left.as_ref(), &self.left_field)?;
        let (right, rpos) = self.sorted_input(self.right.as_ref(), &self.right_field)?;

        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            match left[i][lpos].cmp(&right[j][rpos]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    let key = left[i][lpos].clone();
                    let group_end = j + right[j..].iter().take_while(|r| r[rpos] == key).count();
                    while i < left.len() && left[i][lpos] == key {
                        for r in &right[j..group_end] {
                            let mut row = left[i].clone();
                            row.extend(r.iter().cloned());
                            out.push(row);
                        }
                        i += 1;
                    }
                    j = group_end;
                }
            }
        }

        Ok(Box::new(out.into_iter().map(Ok)))
    }

    fn children(&self) -> Vec<&dyn Plan> {
        vec![self.left.as_ref(), self.right.as_ref()]
    }

    fn sorted_on(&self) -> Option<&str> {
        Some(&self.left_field)
    }

    fn describe(&self) -> String {
        format!("MergeJoin {} = {}", self.left_field, self.right_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::plan::fixtures::RowsPlan;
    use crate::storage::StorageManager;
    use crate::wal::LogManager;
    use tempfile::TempDir;

    fn transaction(temp: &TempDir) -> Transaction {
        let storage = Arc::new(StorageManager::open(temp.path()).unwrap());
        let log = Arc::new(LogManager::open(&temp.path().join("rel.log")).unwrap());
        let buffers = Arc::new(BufferManager::new(4).unwrap());
        Transaction::begin(1, log, buffers, storage).unwrap()
    }

    fn keys(rows: &[Row]) -> Vec<(i64, i64)> {
        rows.iter()
            .map(|r| (r[0].as_int().unwrap(), r[1].as_int().unwrap()))
            .collect()
    }

    #[test]
    fn test_duplicate_keys_on_both_sides() {
        let temp = TempDir::new().unwrap();
        let tx = transaction(&temp);
        let join = MergeJoinPlan::new(
            Box::new(RowsPlan::new("a.k", &[7, 1, 7])),
            Box::new(RowsPlan::new("b.k", &[7, 2, 7, 7])),
            "a.k",
            "b.k",
            &tx,
        )
        .unwrap();

        let rows = collect_rows(&join).unwrap();
        assert_eq!(rows.len(), 6);
        assert!(keys(&rows).iter().all(|pair| *pair == (7, 7)));
    }

    #[test]
    fn test_unordered_inputs_sorted_before_merge() {
        let temp = TempDir::new().unwrap();
        let tx = transaction(&temp);
        let join = MergeJoinPlan::new(
            Box::new(RowsPlan::new("a.k", &[3, 1, 2])),
            Box::new(RowsPlan::new("b.k", &[2, 3, 1])),
            "a.k",
            "b.k",
            &tx,
        )
        .unwrap();

        assert_eq!(
            keys(&collect_rows(&join).unwrap()),
            vec![(1, 1), (2, 2), (3, 3)]
        );
    }

    #[test]
    fn test_input_claiming_order_is_not_resorted() {
        let temp = TempDir::new().unwrap();
        let tx = transaction(&temp);
        // left claims an order it does not have, so only a merge that
        // trusts the claim stops after the first match
        let join = MergeJoinPlan::new(
            Box::new(RowsPlan::new("a.k", &[3, 1, 2]).claiming_order()),
            Box::new(RowsPlan::new("b.k", &[1, 2, 3])),
            "a.k",
            "b.k",
            &tx,
        )
        .unwrap();

        assert_eq!(keys(&collect_rows(&join).unwrap()), vec![(3, 3)]);
    }

    #[test]
    fn test_sort_pins_a_buffer_slot() {
        let temp = TempDir::new().unwrap();
        let storage = Arc::new(StorageManager::open(temp.path()).unwrap());
        let log = Arc::new(LogManager::open(&temp.path().join("rel.log")).unwrap());
        let buffers = Arc::new(BufferManager::new(1).unwrap());
        let tx = Transaction::begin(1, log, Arc::clone(&buffers), storage).unwrap();

        let join = MergeJoinPlan::new(
            Box::new(RowsPlan::new("a.k", &[1])),
            Box::new(RowsPlan::new("b.k", &[1])),
            "a.k",
            "b.k",
            &tx,
        )
        .unwrap();

        let _held = buffers.pin("other").unwrap();
        assert!(join.open().is_err());
    }

    #[test]
    fn test_ordered_inputs_need_no_buffer() {
        let temp = TempDir::new().unwrap();
        let storage = Arc::new(StorageManager::open(temp.path()).unwrap());
        let log = Arc::new(LogManager::open(&temp.path().join("rel.log")).unwrap());
        let buffers = Arc::new(BufferManager::new(1).unwrap());
        let tx = Transaction::begin(1, log, Arc::clone(&buffers), storage).unwrap();

        let join = MergeJoinPlan::new(
            Box::new(RowsPlan::new("a.k", &[1, 2]).claiming_order()),
            Box::new(RowsPlan::new("b.k", &[2, 3]).claiming_order()),
            "a.k",
            "b.k",
            &tx,
        )
        .unwrap();

        let _held = buffers.pin("other").unwrap();
        assert_eq!(keys(&collect_rows(&join).unwrap()), vec![(2, 2)]);
    }

    #[test]
    fn test_join_field_must_exist() {
        let temp = TempDir::new().unwrap();
        let tx = transaction(&temp);
        let err = MergeJoinPlan::new(
            Box::new(RowsPlan::new("a.k", &[1])),
            Box::new(RowsPlan::new("b.k", &[1])),
            "a.k",
            "b.missing",
            &tx,
        )
        .err()
        .unwrap();

        assert_eq!(err.code().code(), "REL_UNKNOWN_FIELD");
    }
}
