//! CLI module for remotable
//!
//! Provides a non-interactive front end:
//! - query: run setup statements, then one query
//! - explain: run setup statements, then show the host query plan

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, query, run, run_command, run_sql, QueryOutput};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
