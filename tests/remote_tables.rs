//! Remote Table Tests
//!
//! Full-stack tests: a SQLite file plays the remote source, an in-memory
//! SQLite connection plays the host engine.
//!
//! - Pushdown negotiation is visible in the host query plan
//! - Results are correct whether or not predicates are pushed
//! - Introspection is idempotent
//! - Row identifiers are a per-cursor sequence
//! - Creation failures register nothing

use std::path::{Path, PathBuf};
use std::sync::Arc;

use remotable::cli::run_sql;
use remotable::config::{Config, TableOptions};
use remotable::schema::{Combinator, SourceKind};
use remotable::vtab::{register_module, ModuleContext};
use rusqlite::Connection;
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn remote_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("remote.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "create table orders (
            id integer primary key,
            customer_id integer,
            status text,
            total decimal(10,2),
            placed_at datetime
        );
        insert into orders values (1, 42, 'open', 12.50, '2024-01-15 13:45:00');
        insert into orders values (2, 7, 'closed', 3.25, '2024-01-16 09:00:00');
        insert into orders values (3, 42, 'closed', 99.99, null);
        insert into orders values (4, 9, 'open', 0, '2024-02-01 00:00:00');",
    )
    .unwrap();
    path
}

fn host(config: Config) -> (Connection, Arc<ModuleContext>) {
    let conn = Connection::open_in_memory().unwrap();
    let context = Arc::new(ModuleContext::from_config(config));
    register_module(&conn, Arc::clone(&context)).unwrap();
    (conn, context)
}

fn create_sql(table: &str, source: &str, path: &Path) -> String {
    format!(
        "create virtual table {} using remotable(sqlite, {}, path='{}')",
        table,
        source,
        path.display()
    )
}

fn indexed(columns: &[(&str, u32)]) -> TableOptions {
    columns
        .iter()
        .fold(TableOptions::default(), |opts, (c, cost)| opts.with_index_cost(*c, *cost))
}

fn ids(conn: &Connection, sql: &str) -> Vec<i64> {
    let mut stmt = conn.prepare(sql).unwrap();
    let rows = stmt.query_map([], |row| row.get::<_, i64>(0)).unwrap();
    rows.map(|r| r.unwrap()).collect()
}

fn plan_detail(conn: &Connection, sql: &str) -> String {
    let mut stmt = conn.prepare(&format!("explain query plan {}", sql)).unwrap();
    let rows = stmt.query_map([], |row| row.get::<_, String>(3)).unwrap();
    rows.map(|r| r.unwrap()).collect::<Vec<_>>().join("\n")
}

// =============================================================================
// Pushdown Tests
// =============================================================================

/// An indexed equality is pushed with its cost and token.
#[test]
fn test_indexed_equality_pushed() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, context) = host(Config::default().with_table("orders", indexed(&[("customer_id", 10)])));
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    let sql = "select id from orders where customer_id = 42 order by id";
    let detail = plan_detail(&conn, sql);
    assert!(
        detail.contains(r#"INDEX 1:[[1,"customer_id","="]]"#),
        "unexpected plan: {}",
        detail
    );

    assert_eq!(ids(&conn, sql), vec![1, 3]);
    let metrics = context.telemetry().metrics.snapshot();
    assert!(metrics.plans_built >= 1);
    assert_eq!(metrics.tables_created, 1);
}

/// A predicate on a non-indexable column is evaluated by the host.
#[test]
fn test_unindexed_predicate_full_scan() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, context) = host(Config::default().with_table("orders", indexed(&[("customer_id", 10)])));
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    let sql = "select id from orders where status = 'open' order by id";
    assert!(plan_detail(&conn, sql).contains("INDEX 0:"));
    assert_eq!(ids(&conn, sql), vec![1, 4]);

    // Every remote row was transferred
    assert_eq!(context.telemetry().metrics.snapshot().rows_fetched, 4);
}

/// Without any configuration nothing is ever pushed.
#[test]
fn test_no_index_costs_never_pushes() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, context) = host(Config::default());
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    assert_eq!(ids(&conn, "select id from orders where id = 2"), vec![2]);
    let metrics = context.telemetry().metrics.snapshot();
    assert_eq!(metrics.plans_built, metrics.full_scans_planned);
}

/// Multiple pushed predicates return correct rows under both combinators.
#[test]
fn test_combinators_return_same_rows() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let sql = "select id from orders where customer_id = 42 and status = 'closed'";

    for combinator in [Combinator::Or, Combinator::And] {
        let options = indexed(&[("customer_id", 10), ("status", 5)]).with_combinator(combinator);
        let (conn, _) = host(Config::default().with_table("orders", options));
        conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

        assert_eq!(ids(&conn, sql), vec![3], "combinator {:?}", combinator);
    }
}

/// Range and null tests are pushable too.
#[test]
fn test_range_and_null_predicates() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let options = indexed(&[("id", 1), ("placed_at", 2)]);
    let (conn, _) = host(Config::default().with_table("orders", options));
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    assert_eq!(
        ids(&conn, "select id from orders where id >= 2 and id < 4 order by id"),
        vec![2, 3]
    );
    assert_eq!(ids(&conn, "select id from orders where placed_at is null"), vec![3]);
    assert_eq!(
        ids(&conn, "select id from orders where placed_at is not null order by id"),
        vec![1, 2, 4]
    );
}

/// Self-join opens two independent cursors over one table.
#[test]
fn test_self_join() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, context) = host(Config::default().with_table("orders", indexed(&[("customer_id", 10)])));
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    let mut stmt = conn
        .prepare(
            "select a.id, b.id from orders a join orders b
             on a.customer_id = b.customer_id where a.id < b.id",
        )
        .unwrap();
    let pairs: Vec<(i64, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(pairs, vec![(1, 3)]);
    assert!(context.telemetry().metrics.snapshot().cursors_opened >= 2);
}

/// Scans run on the connection opened when the table was created.
#[test]
fn test_scans_use_registration_connection() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, _) = host(Config::default());
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    let replacement = dir.path().join("replacement.db");
    Connection::open(&replacement)
        .unwrap()
        .execute_batch(
            "create table orders (id integer, customer_id integer, status text,
                                  total decimal(10,2), placed_at datetime);
             insert into orders values (99, 1, 'open', 1, null);",
        )
        .unwrap();
    std::fs::rename(&replacement, &path).unwrap();

    assert_eq!(ids(&conn, "select id from orders order by id"), vec![1, 2, 3, 4]);
}

// =============================================================================
// Schema and Value Tests
// =============================================================================

fn table_info(conn: &Connection, table: &str) -> Vec<(String, String)> {
    let mut stmt = conn
        .prepare(&format!("select name, type from pragma_table_info('{}')", table))
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap();
    rows.map(|r| r.unwrap()).collect()
}

/// Declared remote types map onto host types.
#[test]
fn test_declared_schema() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, _) = host(Config::default());
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    let expected: Vec<(String, String)> = [
        ("id", "INTEGER"),
        ("customer_id", "INTEGER"),
        ("status", "TEXT"),
        ("total", "REAL"),
        ("placed_at", "REAL"),
    ]
    .iter()
    .map(|(n, t)| (n.to_string(), t.to_string()))
    .collect();

    let actual: Vec<(String, String)> = table_info(&conn, "orders")
        .into_iter()
        .map(|(n, t)| (n, t.to_ascii_uppercase()))
        .collect();
    assert_eq!(actual, expected);
}

/// Introspecting the same source twice yields the same schema.
#[test]
fn test_introspection_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, _) = host(Config::default());
    conn.execute_batch(&create_sql("first", "orders", &path)).unwrap();
    conn.execute_batch(&create_sql("second", "orders", &path)).unwrap();

    assert_eq!(table_info(&conn, "first"), table_info(&conn, "second"));
}

/// Dates become ISO text, decimals become reals, nulls stay null.
#[test]
fn test_values_coerced() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, context) = host(Config::default());
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    let (total, placed): (f64, String) = conn
        .query_row("select total, placed_at from orders where id = 1", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(total, 12.5);
    assert_eq!(placed, "2024-01-15 13:45:00");

    let missing: Option<String> = conn
        .query_row("select placed_at from orders where id = 3", [], |row| row.get(0))
        .unwrap();
    assert_eq!(missing, None);
    assert!(context.telemetry().diagnostics.is_empty());
}

/// Row identifiers strictly increase from zero within one scan.
#[test]
fn test_rowid_sequence() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, _) = host(Config::default());
    conn.execute_batch(&create_sql("orders", "orders", &path)).unwrap();

    assert_eq!(ids(&conn, "select rowid from orders"), vec![0, 1, 2, 3]);
}

/// A query text source is wrapped as a derived table.
#[test]
fn test_query_source() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, _) = host(
        Config::default().with_table("open_orders", indexed(&[("id", 1)])),
    );
    conn.execute_batch(&create_sql(
        "open_orders",
        "'select id, status from orders where status = ''open'''",
        &path,
    ))
    .unwrap();

    assert_eq!(
        table_info(&conn, "open_orders")
            .into_iter()
            .map(|(n, _)| n)
            .collect::<Vec<_>>(),
        vec!["id", "status"]
    );
    assert_eq!(ids(&conn, "select id from open_orders order by id"), vec![1, 4]);
    assert_eq!(ids(&conn, "select id from open_orders where id = 4"), vec![4]);
}

/// An explicit source kind overrides inference.
#[test]
fn test_explicit_source_kind() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let options = TableOptions::default().with_source_kind(SourceKind::Query);
    let (conn, _) = host(Config::default().with_table("totals", options));
    conn.execute_batch(&create_sql(
        "totals",
        "'values (1, 2.5)'",
        &path,
    ))
    .unwrap();

    let count: i64 = conn
        .query_row("select count(*) from totals", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

// =============================================================================
// Failure Tests
// =============================================================================

/// A connection failure registers no table.
#[test]
fn test_connection_error_registers_nothing() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.db");
    let (conn, context) = host(Config::default());

    let err = conn
        .execute_batch(&create_sql("orders", "orders", &missing))
        .unwrap_err();
    assert!(
        err.to_string().contains("REMOTABLE_INTROSPECTION_FAILED"),
        "unexpected error: {}",
        err
    );

    assert!(conn.prepare("select * from orders").is_err());
    let metrics = context.telemetry().metrics.snapshot();
    assert_eq!(metrics.tables_failed, 1);
    assert_eq!(metrics.tables_created, 0);
}

/// A missing remote table fails at probe time.
#[test]
fn test_probe_error_registers_nothing() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, _) = host(Config::default());

    let err = conn
        .execute_batch(&create_sql("ghosts", "ghosts", &path))
        .unwrap_err();
    assert!(err.to_string().contains("REMOTABLE_INTROSPECTION_FAILED"));
    assert!(conn.prepare("select * from ghosts").is_err());
}

/// Unknown driver tags are rejected.
#[test]
fn test_unknown_driver() {
    let (conn, _) = host(Config::default());
    let err = conn
        .execute_batch("create virtual table t using remotable(oracle, orders, 'dsn')")
        .unwrap_err();
    assert!(err.to_string().contains("REMOTABLE_UNKNOWN_DRIVER"));
}

/// Indexable columns must exist remotely.
#[test]
fn test_unknown_index_column() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let (conn, _) = host(Config::default().with_table("orders", indexed(&[("customer", 1)])));

    let err = conn
        .execute_batch(&create_sql("orders", "orders", &path))
        .unwrap_err();
    assert!(err.to_string().contains("REMOTABLE_CONFIG_INVALID"));
}

/// Connect parameters are literals, never expressions.
#[test]
fn test_expression_parameter_rejected() {
    let (conn, _) = host(Config::default());
    let err = conn
        .execute_batch("create virtual table t using remotable(sqlite, orders, path=load('x'))")
        .unwrap_err();
    assert!(err.to_string().contains("REMOTABLE_CONFIG_INVALID"));
}

// =============================================================================
// CLI Tests
// =============================================================================

/// The CLI runs setup statements and returns all rows.
#[test]
fn test_cli_query() {
    let dir = TempDir::new().unwrap();
    let path = remote_db(&dir);
    let config = Config {
        setup: vec![create_sql("orders", "orders", &path)],
        ..Config::default()
    }
    .with_table("orders", indexed(&[("customer_id", 10)]));

    let output = run_sql(&config, "select id, status from orders where customer_id = 42 order by id")
        .unwrap();
    assert_eq!(output.columns, vec!["id", "status"]);
    assert_eq!(
        output.to_json()["rows"],
        json!([[1, "open"], [3, "closed"]])
    );
    assert_eq!(output.metrics.tables_created, 1);
}
