//! Buffer pool
//!
//! A fixed number of slots, each holding one pinned block. Scans pin the
//! block of the table they read for as long as their row stream is alive.
//! Pinning an already-pinned block shares its slot.

mod manager;

pub use manager::{BufferError, BufferManager, BufferPin, BufferResult};
