//! Recovery pass over the durability log
//!
//! Reads the log backwards to the most recent checkpoint and classifies
//! every transaction seen since then. Transactions that never finished are
//! closed with a ROLLBACK record, then a CHECKPOINT is written so the next
//! pass starts from here.

use std::collections::BTreeSet;

use crate::wal::{LogManager, LogRecordType};

use super::errors::RecoveryResult;

/// Outcome of one recovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoverySummary {
    /// Records examined (since the last checkpoint)
    pub records_scanned: usize,
    /// Transactions with a COMMIT record
    pub committed: BTreeSet<u64>,
    /// Transactions with a ROLLBACK record
    pub rolled_back: BTreeSet<u64>,
    /// Transactions with only a START record; rolled back by this pass
    pub incomplete: BTreeSet<u64>,
    /// Sequence number of the checkpoint this pass wrote
    pub checkpoint_lsn: u64,
}

/// Runs recovery against a log
pub struct RecoveryManager<'a> {
    log: &'a LogManager,
}

impl<'a> RecoveryManager<'a> {
    pub fn new(log: &'a LogManager) -> Self {
        Self { log }
    }

    /// Classifies transactions and checkpoints the log.
    ///
    /// `active_tx` is the transaction running the pass; it is never
    /// reported as incomplete.
    pub fn recover(&self, active_tx: u64) -> RecoveryResult<RecoverySummary> {
        let records = self.log.records()?;
        let mut summary = RecoverySummary::default();

        for record in records.iter().rev() {
            match record.record_type {
                LogRecordType::Checkpoint => break,
                LogRecordType::Commit => {
                    summary.committed.insert(record.tx_id);
                }
                LogRecordType::Rollback => {
                    summary.rolled_back.insert(record.tx_id);
                }
                LogRecordType::Start => {
                    if record.tx_id != active_tx
                        && !summary.committed.contains(&record.tx_id)
                        && !summary.rolled_back.contains(&record.tx_id)
                    {
                        summary.incomplete.insert(record.tx_id);
                    }
                }
            }
            summary.records_scanned += 1;
        }

        for tx_id in &summary.incomplete {
            self.log.append(LogRecordType::Rollback, *tx_id)?;
        }
        summary.checkpoint_lsn = self.log.append(LogRecordType::Checkpoint, 0)?;
        self.log.flush(summary.checkpoint_lsn)?;

        Ok(summary)
    }
}

/// Highest transaction id present in the log, 0 if none
pub fn max_tx_id(log: &LogManager) -> RecoveryResult<u64> {
    Ok(log.records()?.iter().map(|r| r.tx_id).max().unwrap_or(0))
}
