//! Observability subsystem
//!
//! - Structured JSON log lines (`Logger`, `format_line`)
//! - Typed lifecycle and planning events (`Event`)
//! - Injectable diagnostic sinks (`DiagnosticSink`)
//!
//! # Principles
//!
//! 1. Observability is write-only; nothing reads diagnostics back to decide
//! 2. A sink failure never fails the operation being observed
//! 3. No async or background threads
//! 4. Deterministic line layout

mod events;
mod logger;
mod sink;

pub use events::Event;
pub use logger::{format_line, Logger, Severity};
pub use sink::{
    emit, DiagnosticRecord, DiagnosticSink, FileDiagnosticSink, MemoryDiagnosticSink,
    NullDiagnosticSink,
};
