//! Engine composition root
//!
//! `Engine::boot` wires storage, durability log, diagnostic sink, buffer
//! pool and catalog in dependency order and resolves the configured query
//! planner strategy. `Engine::shutdown` is the only teardown path.

mod config;
mod engine;
mod errors;

pub use config::EngineConfig;
pub use engine::Engine;
pub use errors::{ServerError, ServerErrorCode, ServerResult};
