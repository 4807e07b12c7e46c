//! relplan CLI entry point
//!
//! Parses arguments, dispatches to the CLI commands, prints errors to
//! stderr and exits non-zero on failure. Everything else lives in the
//! `cli` module.

use relplan::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
