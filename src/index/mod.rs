//! Index structures for relplan
//!
//! Indexes are derived, in-memory-only state maintained by the update
//! planner alongside heap writes.
//!
//! # Invariants
//!
//! - Updates occur AFTER heap writes
//! - Lookup returns row ids sorted ascending
//! - Only B-tree indexes support ordered scans

mod btree;
mod descriptor;
mod hash;

use std::fmt;

use crate::query::Constant;
use crate::storage::RowId;

pub use btree::BTreeIndex;
pub use descriptor::{CreateIndexData, IndexType};
pub use hash::HashIndex;

/// Single-field secondary index
pub trait Index: fmt::Debug + Send + Sync {
    fn index_type(&self) -> IndexType;

    fn insert(&mut self, key: Constant, row: RowId);

    fn remove(&mut self, key: &Constant, row: RowId);

    /// Row ids whose key equals `key`, ascending
    fn lookup(&self, key: &Constant) -> Vec<RowId>;

    /// Total number of entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every row id in key order, or `None` if the structure is unordered
    fn ordered_rows(&self) -> Option<Vec<RowId>> {
        None
    }
}

/// Instantiates the structure named by `index_type`
pub fn new_index(index_type: IndexType) -> Box<dyn Index> {
    match index_type {
        IndexType::BTree => Box::new(BTreeIndex::new()),
        IndexType::Hash => Box::new(HashIndex::new()),
    }
}
