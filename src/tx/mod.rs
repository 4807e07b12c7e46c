//! Transaction handles
//!
//! Transactions are opened by the engine, passed by reference to planners
//! and plans, and finished by the caller with `commit` or `rollback`.
//! Dropping an unfinished transaction leaves it incomplete in the log;
//! the next recovery pass reports it.

mod transaction;

pub use transaction::{Transaction, UndoAction};
