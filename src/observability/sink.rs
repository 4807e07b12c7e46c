//! Diagnostic sinks
//!
//! The diagnostic channel is separate from the durability log. Components
//! that report diagnostics receive an `Arc<dyn DiagnosticSink>` at
//! construction. Each record is written as one JSON line under the sink's
//! mutex, so concurrent writers never interleave within a record.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::events::Event;
use super::logger::{format_line, Logger, Severity};

/// One diagnostic record
#[derive(Debug, Clone)]
pub struct DiagnosticRecord {
    pub id: Uuid,
    /// RFC 3339 creation time
    pub timestamp: String,
    pub event: Event,
    pub severity: Severity,
    pub fields: Vec<(String, String)>,
}

impl DiagnosticRecord {
    /// Creates a record with the event's default severity
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            event,
            severity: event.severity(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Value of the first field named `key`
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Serializes to a single JSON line
    pub fn to_json_line(&self) -> String {
        let id = self.id.to_string();
        let mut fields: Vec<(&str, &str)> = vec![("id", &id), ("ts", &self.timestamp)];
        fields.extend(self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        format_line(self.severity, self.event.as_str(), &fields)
    }
}

/// Append-only destination for diagnostic records
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: &DiagnosticRecord) -> io::Result<()>;

    fn flush(&self) -> io::Result<()>;
}

/// Writes `record` to `sink`. A failed write is reported on stderr and
/// otherwise ignored; diagnostics never fail the caller.
pub fn emit(sink: &dyn DiagnosticSink, record: DiagnosticRecord) {
    if let Err(e) = sink.record(&record) {
        Logger::error(
            "DIAGNOSTIC_WRITE_FAILED",
            &[("event", record.event.as_str()), ("error", &e.to_string())],
        );
    }
}

/// JSON-lines file sink
pub struct FileDiagnosticSink {
    path: PathBuf,
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl FileDiagnosticSink {
    /// Opens or creates the file in append mode
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticSink for FileDiagnosticSink {
    fn record(&self, record: &DiagnosticRecord) -> io::Result<()> {
        let line = record.to_json_line();
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    fn flush(&self) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

/// In-memory sink for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryDiagnosticSink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemoryDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of records for `event`
    pub fn count(&self, event: Event) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.event == event)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn record(&self, record: &DiagnosticRecord) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnosticSink;

impl DiagnosticSink for NullDiagnosticSink {
    fn record(&self, _record: &DiagnosticRecord) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}
