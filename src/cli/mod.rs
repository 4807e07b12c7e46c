//! CLI module for relplan
//!
//! Provides command-line interface for:
//! - init: Boot once to create the data directory, catalog and log
//! - start: Boot and serve JSON-lines requests until stdin closes

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve, start, Request};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_response};
