//! BTreeMap-based ordered index
//!
//! Maps key values to sorted lists of row ids. Iteration follows the total
//! order of `Constant`, so an in-order walk yields rows sorted on the key.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::query::Constant;
use crate::storage::RowId;

use super::{Index, IndexType};

/// Ordered single-field index
#[derive(Debug, Default)]
pub struct BTreeIndex {
    tree: BTreeMap<Constant, Vec<RowId>>,
}

impl BTreeIndex {
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Lookup row ids with keys in [min, max] (inclusive).
    ///
    /// A missing bound is open on that side.
    pub fn lookup_range(&self, min: Option<&Constant>, max: Option<&Constant>) -> Vec<RowId> {
        let min_bound = match min {
            Some(k) => Bound::Included(k),
            None => Bound::Unbounded,
        };
        let max_bound = match max {
            Some(k) => Bound::Included(k),
            None => Bound::Unbounded,
        };

        let mut result = Vec::new();
        for (_, rows) in self.tree.range::<Constant, _>((min_bound, max_bound)) {
            result.extend(rows);
        }
        result
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }
}

impl Index for BTreeIndex {
    fn index_type(&self) -> IndexType {
        IndexType::BTree
    }

    fn insert(&mut self, key: Constant, row: RowId) {
        let rows = self.tree.entry(key).or_default();
        if let Err(pos) = rows.binary_search(&row) {
            rows.insert(pos, row);
        }
    }

    fn remove(&mut self, key: &Constant, row: RowId) {
        if let Some(rows) = self.tree.get_mut(key) {
            if let Ok(pos) = rows.binary_search(&row) {
                rows.remove(pos);
            }
            if rows.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    fn lookup(&self, key: &Constant) -> Vec<RowId> {
        self.tree.get(key).cloned().unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.tree.values().map(|v| v.len()).sum()
    }

    fn ordered_rows(&self) -> Option<Vec<RowId>> {
        Some(self.lookup_range(None, None))
    }
}
