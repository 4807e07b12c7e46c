//! Engine context
//!
//! Owns every collaborator handle. Built once by `boot`, shared by
//! reference or `Arc`, and torn down by `shutdown`.
//!
//! # Boot sequence (strict order)
//!
//! 1. Storage manager over the data directory
//! 2. Durability log
//! 3. Diagnostic sink (falls back to a null sink)
//! 4. Buffer pool
//! 5. Bootstrap transaction, plus recovery if the directory pre-existed
//! 6. Catalog
//! 7. Commit

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::buffer::BufferManager;
use crate::catalog::Catalog;
use crate::observability::{
    emit, DiagnosticRecord, DiagnosticSink, Event, FileDiagnosticSink, Logger, NullDiagnosticSink,
};
use crate::planner::{IndexUpdatePlanner, Planner, PlannerKind};
use crate::recovery::{max_tx_id, RecoverySummary};
use crate::storage::StorageManager;
use crate::tx::Transaction;
use crate::wal::{LogManager, LogRecordType};

use super::config::EngineConfig;
use super::errors::{ServerError, ServerResult};

pub struct Engine {
    config: EngineConfig,
    storage: Arc<StorageManager>,
    log: Arc<LogManager>,
    sink: Arc<dyn DiagnosticSink>,
    buffers: Arc<BufferManager>,
    catalog: Arc<Catalog>,
    planner_kind: PlannerKind,
    recovery: Option<RecoverySummary>,
    next_tx_id: AtomicU64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("planner_kind", &self.planner_kind)
            .field("recovery", &self.recovery)
            .field("next_tx_id", &self.next_tx_id)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Boots with a file diagnostic sink inside the data directory
    pub fn boot(config: EngineConfig) -> ServerResult<Self> {
        Self::boot_with(config, None)
    }

    /// Boots with the given diagnostic sink
    pub fn boot_with_sink(config: EngineConfig, sink: Arc<dyn DiagnosticSink>) -> ServerResult<Self> {
        Self::boot_with(config, Some(sink))
    }

    fn boot_with(config: EngineConfig, sink: Option<Arc<dyn DiagnosticSink>>) -> ServerResult<Self> {
        config.validate()?;

        let storage = Arc::new(StorageManager::open(config.data_path())?);
        let log = Arc::new(LogManager::open(&config.log_path())?);
        let sink = sink.unwrap_or_else(|| open_sink(&config));
        emit(
            sink.as_ref(),
            DiagnosticRecord::new(Event::BootStart).with_field("data_dir", &config.data_dir),
        );

        let buffers = Arc::new(BufferManager::new(config.buffer_pool_size)?);

        let bootstrap_id = max_tx_id(&log)? + 1;
        let tx = Transaction::begin(
            bootstrap_id,
            Arc::clone(&log),
            Arc::clone(&buffers),
            Arc::clone(&storage),
        )?;

        let recovery = if storage.is_new() {
            None
        } else {
            emit(sink.as_ref(), DiagnosticRecord::new(Event::RecoveryStart));
            let summary = tx.recover()?;
            emit(
                sink.as_ref(),
                DiagnosticRecord::new(Event::RecoveryComplete)
                    .with_field("committed", summary.committed.len())
                    .with_field("rolled_back", summary.rolled_back.len())
                    .with_field("incomplete", summary.incomplete.len())
                    .with_field("checkpoint_lsn", summary.checkpoint_lsn),
            );
            Some(summary)
        };

        let catalog = Arc::new(Catalog::bootstrap(&tx)?);
        tx.commit()?;

        let planner_kind = PlannerKind::resolve(&config.query_planner, sink.as_ref());
        emit(
            sink.as_ref(),
            DiagnosticRecord::new(Event::PlannerSelected)
                .with_field("key", &config.query_planner)
                .with_field("planner", planner_kind),
        );
        emit(sink.as_ref(), DiagnosticRecord::new(Event::BootComplete));

        Ok(Self {
            config,
            storage,
            log,
            sink,
            buffers,
            catalog,
            planner_kind,
            recovery,
            next_tx_id: AtomicU64::new(bootstrap_id + 1),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    pub fn buffers(&self) -> &Arc<BufferManager> {
        &self.buffers
    }

    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    pub fn log(&self) -> &Arc<LogManager> {
        &self.log
    }

    /// Strategy resolved from the configuration key
    pub fn planner_kind(&self) -> PlannerKind {
        self.planner_kind
    }

    /// Summary of the boot-time recovery pass, if one ran
    pub fn recovery_summary(&self) -> Option<&RecoverySummary> {
        self.recovery.as_ref()
    }

    pub fn new_transaction(&self) -> ServerResult<Transaction> {
        let id = self.next_tx_id.fetch_add(1, Ordering::SeqCst);
        Ok(Transaction::begin(
            id,
            Arc::clone(&self.log),
            Arc::clone(&self.buffers),
            Arc::clone(&self.storage),
        )?)
    }

    /// The configured strategy plus the index update planner
    pub fn planner(&self) -> Planner {
        self.planner_for(self.planner_kind)
    }

    pub fn planner_for(&self, kind: PlannerKind) -> Planner {
        Planner::new(
            kind.build(Arc::clone(&self.catalog), Arc::clone(&self.sink)),
            Box::new(IndexUpdatePlanner::new(Arc::clone(&self.catalog))),
        )
    }

    /// Checkpoints and flushes the durability log, then the diagnostic sink.
    pub fn shutdown(self) -> ServerResult<()> {
        emit(self.sink.as_ref(), DiagnosticRecord::new(Event::ShutdownStart));

        let lsn = self
            .log
            .append(LogRecordType::Checkpoint, 0)
            .map_err(|e| ServerError::shutdown_failed(e.to_string()))?;
        self.log
            .flush(lsn)
            .map_err(|e| ServerError::shutdown_failed(e.to_string()))?;

        emit(
            self.sink.as_ref(),
            DiagnosticRecord::new(Event::ShutdownComplete).with_field("checkpoint_lsn", lsn),
        );
        if let Err(e) = self.sink.flush() {
            Logger::error("DIAGNOSTIC_FLUSH_FAILED", &[("error", &e.to_string())]);
        }
        Ok(())
    }
}

/// Opens the file sink, or reports the failure and uses a null sink.
fn open_sink(config: &EngineConfig) -> Arc<dyn DiagnosticSink> {
    let path = config.diagnostic_log_path();
    match FileDiagnosticSink::open(&path) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            Logger::log_stderr(
                Event::DiagnosticSinkUnavailable.severity(),
                Event::DiagnosticSinkUnavailable.as_str(),
                &[
                    ("path", &path.display().to_string()),
                    ("error", &e.to_string()),
                ],
            );
            Arc::new(NullDiagnosticSink)
        }
    }
}
