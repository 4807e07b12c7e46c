//! relplan - a relational query planning engine
//!
//! Query planning over an in-memory catalog: table scans, selections,
//! products, projections and merge joins, chosen by one of four
//! interchangeable strategies. Transactions are logged to a durability
//! log that is recovered at boot.

pub mod buffer;
pub mod catalog;
pub mod cli;
pub mod index;
pub mod observability;
pub mod planner;
pub mod query;
pub mod recovery;
pub mod server;
pub mod storage;
pub mod tx;
pub mod wal;
