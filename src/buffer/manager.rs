//! Buffer manager with RAII pins

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Buffer errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("No free buffer for block '{block}': all {capacity} buffers pinned")]
    Abort { block: String, capacity: usize },

    #[error("Buffer pool size must be > 0")]
    ZeroCapacity,
}

#[derive(Debug)]
struct PoolState {
    /// block name -> pin count
    pinned: HashMap<String, usize>,
}

/// Fixed-size pool of buffer slots
#[derive(Debug)]
pub struct BufferManager {
    capacity: usize,
    state: Arc<Mutex<PoolState>>,
}

impl BufferManager {
    /// Creates a pool with `capacity` slots
    pub fn new(capacity: usize) -> BufferResult<Self> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            state: Arc::new(Mutex::new(PoolState {
                pinned: HashMap::new(),
            })),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of unpinned slots
    pub fn available(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.capacity - state.pinned.len()
    }

    /// Pins `block`, taking a free slot unless it is already pinned.
    ///
    /// Fails immediately when every slot holds another block.
    pub fn pin(&self, block: &str) -> BufferResult<BufferPin> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.pinned.get_mut(block) {
            Some(count) => *count += 1,
            None => {
                if state.pinned.len() >= self.capacity {
                    return Err(BufferError::Abort {
                        block: block.to_string(),
                        capacity: self.capacity,
                    });
                }
                state.pinned.insert(block.to_string(), 1);
            }
        }

        Ok(BufferPin {
            block: block.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

/// A pinned block; unpins on drop
#[derive(Debug)]
pub struct BufferPin {
    block: String,
    state: Arc<Mutex<PoolState>>,
}

impl BufferPin {
    pub fn block(&self) -> &str {
        &self.block
    }
}

impl Drop for BufferPin {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = state.pinned.get_mut(&self.block) {
            *count -= 1;
            if *count == 0 {
                state.pinned.remove(&self.block);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(BufferManager::new(0).unwrap_err(), BufferError::ZeroCapacity);
    }

    #[test]
    fn test_pin_and_unpin() {
        let pool = BufferManager::new(2).unwrap();

        let a = pool.pin("a").unwrap();
        assert_eq!(pool.available(), 1);

        drop(a);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_same_block_shares_slot() {
        let pool = BufferManager::new(1).unwrap();

        let first = pool.pin("a").unwrap();
        let second = pool.pin("a").unwrap();
        assert_eq!(pool.available(), 0);

        drop(first);
        assert_eq!(pool.available(), 0);
        drop(second);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_exhausted_pool_aborts() {
        let pool = BufferManager::new(1).unwrap();
        let _a = pool.pin("a").unwrap();

        let err = pool.pin("b").unwrap_err();
        assert!(matches!(err, BufferError::Abort { capacity: 1, .. }));
    }
}
