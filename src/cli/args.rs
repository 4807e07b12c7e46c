//! CLI argument definitions using clap
//!
//! Commands:
//! - relplan init --config <path>
//! - relplan start --config <path> [--planner <key>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// relplan - a relational query planning engine
#[derive(Parser, Debug)]
#[command(name = "relplan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./relplan.json")]
        config: PathBuf,
    },

    /// Boot the engine and serve JSON-lines requests from stdin
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./relplan.json")]
        config: PathBuf,

        /// Query planner key, overriding `query_planner` in the config
        #[arg(long)]
        planner: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_with_planner_override() {
        let cli = Cli::parse_from(["relplan", "start", "--planner", "smart"]);
        match cli.command {
            Command::Start { config, planner } => {
                assert_eq!(config, PathBuf::from("./relplan.json"));
                assert_eq!(planner.as_deref(), Some("smart"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_init_custom_config() {
        let cli = Cli::parse_from(["relplan", "init", "--config", "/tmp/r.json"]);
        assert!(matches!(&cli.command, Command::Init { config } if config == &PathBuf::from("/tmp/r.json")));
    }
}
