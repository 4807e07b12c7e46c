//! Transactions
//!
//! A transaction is a handle passed explicitly through planning and
//! execution. It logs its own lifecycle and keeps an undo list for the
//! changes made through it. It acquires no locks.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::buffer::BufferManager;
use crate::recovery::{RecoveryManager, RecoveryResult, RecoverySummary};
use crate::storage::StorageManager;
use crate::wal::{LogManager, LogRecordType, WalResult};

/// Compensating action run on rollback
pub type UndoAction = Box<dyn FnOnce() + Send>;

/// Active transaction handle
pub struct Transaction {
    id: u64,
    log: Arc<LogManager>,
    buffers: Arc<BufferManager>,
    storage: Arc<StorageManager>,
    undo: Mutex<Vec<UndoAction>>,
}

impl Transaction {
    /// Starts transaction `id`, logging START.
    pub fn begin(
        id: u64,
        log: Arc<LogManager>,
        buffers: Arc<BufferManager>,
        storage: Arc<StorageManager>,
    ) -> WalResult<Self> {
        log.append(LogRecordType::Start, id)?;
        Ok(Self {
            id,
            log,
            buffers,
            storage,
            undo: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn buffers(&self) -> &Arc<BufferManager> {
        &self.buffers
    }

    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    /// Registers an action that reverses a change made by this transaction
    pub fn on_rollback(&self, action: UndoAction) {
        let mut undo = self.undo.lock().unwrap_or_else(|e| e.into_inner());
        undo.push(action);
    }

    /// Logs COMMIT and makes it durable. Undo actions are discarded.
    pub fn commit(self) -> WalResult<()> {
        let lsn = self.log.append(LogRecordType::Commit, self.id)?;
        self.log.flush(lsn)
    }

    /// Runs undo actions newest first, then logs ROLLBACK.
    pub fn rollback(self) -> WalResult<()> {
        let actions = {
            let mut undo = self.undo.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *undo)
        };
        for action in actions.into_iter().rev() {
            action();
        }
        let lsn = self.log.append(LogRecordType::Rollback, self.id)?;
        self.log.flush(lsn)
    }

    /// Runs the recovery pass over the durability log.
    pub fn recover(&self) -> RecoveryResult<RecoverySummary> {
        RecoveryManager::new(&self.log).recover(self.id)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction").field("id", &self.id).finish()
    }
}
