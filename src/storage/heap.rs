//! In-memory table heaps
//!
//! A heap is a slot vector. Deleting a row leaves a tombstone so that row
//! ids stay stable for the lifetime of the heap; rollback can restore a
//! deleted row into its original slot.

use std::sync::RwLock;

use crate::query::Constant;

/// Stable identifier of a row within its heap
pub type RowId = u64;

/// Row values, aligned with the owning table's schema
pub type Row = Vec<Constant>;

/// Slot-addressed row storage for one table
#[derive(Debug, Default)]
pub struct TableHeap {
    slots: RwLock<Vec<Option<Row>>>,
}

impl TableHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row, returning its id
    pub fn insert(&self, row: Row) -> RowId {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.push(Some(row));
        (slots.len() - 1) as RowId
    }

    /// Tombstones a row, returning its previous contents
    pub fn delete(&self, id: RowId) -> Option<Row> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.get_mut(id as usize).and_then(Option::take)
    }

    /// Puts a row back into an existing slot (used by rollback)
    pub fn restore(&self, id: RowId, row: Row) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = slots.get_mut(id as usize) {
            *slot = Some(row);
        }
    }

    pub fn get(&self, id: RowId) -> Option<Row> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(id as usize).and_then(|s| s.clone())
    }

    /// Live rows in slot order
    pub fn snapshot(&self) -> Vec<(RowId, Row)> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|r| (i as RowId, r.clone())))
            .collect()
    }

    /// Number of live rows
    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
