//! CLI command implementations
//!
//! Every command follows the same sequence:
//! 1. Load and validate the config file
//! 2. Open an in-memory host connection and register the module
//! 3. Run the config's setup statements
//! 4. Run the requested statement and collect all rows
//!
//! Nothing is persisted between invocations.

use std::path::Path;
use std::sync::Arc;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::observability::{Diagnostic, MetricsSnapshot};
use crate::vtab::{register_module, ModuleContext};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Default log filter when `RUST_LOG` is absent or invalid
const DEFAULT_LOG_FILTER: &str = "remotable=info,warn";

/// Collected result of one statement
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub diagnostics: Vec<Diagnostic>,
    pub metrics: MetricsSnapshot,
}

impl QueryOutput {
    /// Response payload written under `data`
    pub fn to_json(&self) -> Value {
        json!({
            "columns": self.columns,
            "rows": self.rows,
            "diagnostics": self.diagnostics,
            "metrics": self.metrics,
        })
    }
}

/// Main CLI entry point
///
/// Parses arguments, runs the command and writes exactly one JSON
/// response to stdout. This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    init_tracing();

    match run_command(cli.command) {
        Ok(output) => write_response(output.to_json()),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<QueryOutput> {
    match cmd {
        Command::Query { config, sql } => query(&config, &sql),
        Command::Explain { config, sql } => explain(&config, &sql),
    }
}

/// Run one query against the configured remote tables
pub fn query(config_path: &Path, sql: &str) -> CliResult<QueryOutput> {
    let config = Config::load(config_path)?;
    run_sql(&config, sql)
}

/// Show the host plan for one query
///
/// The `detail` column names the chosen plan identifier and token for
/// each remote table, e.g. `SCAN orders VIRTUAL TABLE INDEX 1:[[1,"customer_id","="]]`.
pub fn explain(config_path: &Path, sql: &str) -> CliResult<QueryOutput> {
    let config = Config::load(config_path)?;
    run_sql(&config, &format!("explain query plan {}", sql))
}

/// Runs `sql` on a fresh host connection prepared from `config`
pub fn run_sql(config: &Config, sql: &str) -> CliResult<QueryOutput> {
    let conn = Connection::open_in_memory()
        .map_err(|e| CliError::setup_failed(format!("Failed to open host connection: {}", e)))?;

    let context = Arc::new(ModuleContext::from_config(config.clone()));
    register_module(&conn, Arc::clone(&context))
        .map_err(|e| CliError::setup_failed(format!("Failed to register module: {}", e)))?;

    for statement in &config.setup {
        conn.execute_batch(statement)
            .map_err(|e| CliError::setup_failed(format!("{}: {}", statement, e)))?;
    }

    let (columns, rows) = collect_rows(&conn, sql)?;

    Ok(QueryOutput {
        columns,
        rows,
        diagnostics: context.telemetry().diagnostics.entries(),
        metrics: context.telemetry().metrics.snapshot(),
    })
}

fn collect_rows(conn: &Connection, sql: &str) -> CliResult<(Vec<String>, Vec<Vec<Value>>)> {
    let failed = |e: rusqlite::Error| CliError::query_failed(e.to_string());

    let mut stmt = conn.prepare(sql).map_err(failed)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut out = Vec::new();
    let mut rows = stmt.query([]).map_err(failed)?;
    while let Some(row) = rows.next().map_err(failed)? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(json_value(row.get_ref(i).map_err(failed)?));
        }
        out.push(values);
    }
    Ok((columns, out))
}

/// Host value as JSON; blobs become lowercase hex
fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(b.iter().map(|byte| format!("{:02x}", byte)).collect()),
    }
}

/// Installs the stderr log subscriber. A second call is a no-op.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_sql_without_remote_tables() {
        let config = Config::default();
        let output = run_sql(&config, "select 1 as one, 'a' as two, null as three").unwrap();
        assert_eq!(output.columns, vec!["one", "two", "three"]);
        assert_eq!(output.rows, vec![vec![json!(1), json!("a"), Value::Null]]);
    }

    #[test]
    fn test_setup_failure() {
        let config = Config {
            setup: vec!["create virtual table t using remotable(nosuch, t)".to_string()],
            ..Config::default()
        };
        let err = run_sql(&config, "select 1").unwrap_err();
        assert_eq!(err.code_str(), "REMOTABLE_CLI_SETUP_FAILED");
        assert!(err.message().contains("REMOTABLE_UNKNOWN_DRIVER"));
    }

    #[test]
    fn test_query_failure() {
        let err = run_sql(&Config::default(), "select * from missing").unwrap_err();
        assert_eq!(err.code_str(), "REMOTABLE_CLI_QUERY_FAILED");
    }

    #[test]
    fn test_json_values() {
        assert_eq!(json_value(ValueRef::Real(1.5)), json!(1.5));
        assert_eq!(json_value(ValueRef::Real(f64::NAN)), Value::Null);
        assert_eq!(json_value(ValueRef::Blob(&[0, 255])), json!("00ff"));
    }
}
