//! Storage manager
//!
//! Owns the data directory and the set of table heaps. Whether the data
//! directory existed before `open` decides if bootstrap runs recovery.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::errors::{StorageError, StorageResult};
use super::heap::TableHeap;

/// Data directory handle plus table heaps
#[derive(Debug)]
pub struct StorageManager {
    data_dir: PathBuf,
    is_new: bool,
    heaps: RwLock<BTreeMap<String, Arc<TableHeap>>>,
}

impl StorageManager {
    /// Opens the data directory, creating it if missing.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let is_new = !data_dir.exists();
        if is_new {
            fs::create_dir_all(data_dir).map_err(|e| {
                StorageError::io_error(
                    format!("Failed to create data directory: {}", data_dir.display()),
                    e,
                )
            })?;
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            is_new,
            heaps: RwLock::new(BTreeMap::new()),
        })
    }

    /// True if the data directory was created by this `open`
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Creates an empty heap for `table`
    pub fn create_heap(&self, table: &str) -> StorageResult<Arc<TableHeap>> {
        let mut heaps = self.heaps.write().unwrap_or_else(|e| e.into_inner());
        if heaps.contains_key(table) {
            return Err(StorageError::table_exists(table));
        }
        let heap = Arc::new(TableHeap::new());
        heaps.insert(table.to_string(), Arc::clone(&heap));
        Ok(heap)
    }

    /// Removes the heap for `table`, returning it if it existed
    pub fn drop_heap(&self, table: &str) -> Option<Arc<TableHeap>> {
        let mut heaps = self.heaps.write().unwrap_or_else(|e| e.into_inner());
        heaps.remove(table)
    }

    pub fn heap(&self, table: &str) -> Option<Arc<TableHeap>> {
        let heaps = self.heaps.read().unwrap_or_else(|e| e.into_inner());
        heaps.get(table).cloned()
    }

    /// Names of all heaps, sorted
    pub fn heap_names(&self) -> Vec<String> {
        let heaps = self.heaps.read().unwrap_or_else(|e| e.into_inner());
        heaps.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_detects_new_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("db");

        let first = StorageManager::open(&dir).unwrap();
        assert!(first.is_new());
        assert!(dir.exists());

        let second = StorageManager::open(&dir).unwrap();
        assert!(!second.is_new());
    }

    #[test]
    fn test_create_heap_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        let storage = StorageManager::open(temp.path()).unwrap();

        storage.create_heap("students").unwrap();
        let err = storage.create_heap("students").unwrap_err();
        assert_eq!(err.code().code(), "REL_STORAGE_TABLE_EXISTS");
        assert!(storage.heap("students").is_some());
        assert!(storage.heap("missing").is_none());
    }

    #[test]
    fn test_drop_heap_frees_name() {
        let temp = TempDir::new().unwrap();
        let storage = StorageManager::open(temp.path()).unwrap();

        storage.create_heap("students").unwrap();
        assert!(storage.drop_heap("students").is_some());
        assert!(storage.drop_heap("students").is_none());
        storage.create_heap("students").unwrap();
    }
}
