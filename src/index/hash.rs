//! Hash index; equality lookups only

use std::collections::HashMap;

use crate::query::Constant;
use crate::storage::RowId;

use super::{Index, IndexType};

#[derive(Debug, Default)]
pub struct HashIndex {
    buckets: HashMap<Constant, Vec<RowId>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

impl Index for HashIndex {
    fn index_type(&self) -> IndexType {
        IndexType::Hash
    }

    fn insert(&mut self, key: Constant, row: RowId) {
        let rows = self.buckets.entry(key).or_default();
        if let Err(pos) = rows.binary_search(&row) {
            rows.insert(pos, row);
        }
    }

    fn remove(&mut self, key: &Constant, row: RowId) {
        if let Some(rows) = self.buckets.get_mut(key) {
            rows.retain(|r| *r != row);
            if rows.is_empty() {
                self.buckets.remove(key);
            }
        }
    }

    fn lookup(&self, key: &Constant) -> Vec<RowId> {
        self.buckets.get(key).cloned().unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.buckets.values().map(|v| v.len()).sum()
    }
}
