//! CLI argument definitions using clap
//!
//! Commands:
//! - remotable query --config <path> --sql <text>
//! - remotable explain --config <path> --sql <text>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// remotable - query remote relational sources as local SQLite tables
#[derive(Parser, Debug)]
#[command(name = "remotable")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single query and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./remotable.json")]
        config: PathBuf,

        /// SQL to run after the setup statements
        #[arg(long)]
        sql: String,
    },

    /// Show the host query plan and exit
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./remotable.json")]
        config: PathBuf,

        /// SQL to explain after the setup statements
        #[arg(long)]
        sql: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
