//! remotable binary
//!
//! Runs one `query` or `explain` command against the remote tables declared
//! in a config file. The JSON response goes to stdout; a failure also exits
//! with status 1.

use remotable::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
