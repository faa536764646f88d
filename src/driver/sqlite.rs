//! Built-in SQLite adapter
//!
//! Connects to a database file, read-only. The handle opened at connect time
//! is owned by one worker thread for the life of the connection; every cursor
//! sends its query to that worker and receives rows back over its own
//! channel. A cursor closed early drops its receiver and the worker abandons
//! the rest of that result.
//!
//! Row channels are unbounded so that one slow cursor never blocks the
//! worker while another cursor of the same connection waits for its query
//! (a nested-loop self-join does exactly this).
//!
//! Declared column types are mapped onto `SqlTypeCode`; values stored in
//! DECIMAL columns are surfaced as decimals and text stored in DATE/TIME
//! columns as chrono values.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::errors::{RemoteError, RemoteResult};
use super::params::{ConnectParams, Literal};
use super::value::RemoteValue;
use super::{ColumnMeta, RemoteConnection, RemoteCursor, RemoteDriver, SqlTypeCode, TypeIndicator};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Driver for SQLite database files
#[derive(Debug, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        Self
    }
}

impl RemoteDriver for SqliteDriver {
    fn tag(&self) -> &str {
        "sqlite"
    }

    fn connect(&self, params: &ConnectParams) -> RemoteResult<Box<dyn RemoteConnection>> {
        let path = params.string("path", 0).ok_or_else(|| {
            RemoteError::InvalidParams("sqlite driver requires a database path".into())
        })?;

        let mut flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if params.get("uri").and_then(Literal::as_bool).unwrap_or(false) {
            flags |= OpenFlags::SQLITE_OPEN_URI;
        }

        let handle = Connection::open_with_flags(path, flags)
            .map_err(|e| RemoteError::Connect(format!("{}: {}", path, e)))?;
        // Fails early on files that are not databases
        handle
            .query_row("select count(*) from sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|e| RemoteError::Connect(format!("{}: {}", path, e)))?;

        let connection = SqliteConnection::spawn(PathBuf::from(path), handle)?;
        debug!(path, "sqlite remote connection opened");
        Ok(Box::new(connection))
    }
}

enum Request {
    Query {
        sql: String,
        params: Vec<Value>,
        reply: Sender<WorkerMessage>,
    },
    Shutdown,
}

enum WorkerMessage {
    Described(Vec<ColumnMeta>),
    Row(Vec<RemoteValue>),
    Done,
    Failed(RemoteError),
}

/// An open SQLite source
pub struct SqliteConnection {
    path: PathBuf,
    requests: Option<Sender<Request>>,
    worker: Option<JoinHandle<()>>,
}

impl SqliteConnection {
    fn spawn(path: PathBuf, handle: Connection) -> RemoteResult<Self> {
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();
        let worker = thread::Builder::new()
            .name("remotable-sqlite".into())
            .spawn(move || serve(handle, rx, &worker_path))
            .map_err(|e| RemoteError::Connect(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            path,
            requests: Some(tx),
            worker: Some(worker),
        })
    }
}

impl RemoteConnection for SqliteConnection {
    fn cursor(&self) -> RemoteResult<Box<dyn RemoteCursor>> {
        let requests = self.requests.as_ref().ok_or(RemoteError::Closed)?;
        Ok(Box::new(SqliteCursor {
            requests: requests.clone(),
            stream: None,
        }))
    }

    fn close(&mut self) {
        if let Some(requests) = self.requests.take() {
            // Cursors still holding a sender must not keep the handle open
            let _ = requests.send(Request::Shutdown);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(path = %self.path.display(), "sqlite remote worker panicked");
            }
        }
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Worker loop: runs queued queries on the connection's only handle
fn serve(handle: Connection, requests: Receiver<Request>, path: &Path) {
    for request in requests.iter() {
        match request {
            Request::Query { sql, params, reply } => {
                if let Err(e) = stream_rows(&handle, &sql, params, &reply) {
                    let _ = reply.send(WorkerMessage::Failed(e));
                }
            }
            Request::Shutdown => break,
        }
    }

    if let Err((_, e)) = handle.close() {
        warn!(path = %path.display(), error = %e, "sqlite remote close failed");
    }
}

struct Stream {
    rows: Receiver<WorkerMessage>,
    columns: Vec<ColumnMeta>,
    exhausted: bool,
}

/// Cursor reading one query's rows back from the connection worker
pub struct SqliteCursor {
    requests: Sender<Request>,
    stream: Option<Stream>,
}

impl RemoteCursor for SqliteCursor {
    fn execute(&mut self, sql: &str, params: &[RemoteValue]) -> RemoteResult<()> {
        self.close();

        let (reply, rows) = mpsc::channel();
        self.requests
            .send(Request::Query {
                sql: sql.to_string(),
                params: params.iter().map(to_sql_value).collect(),
                reply,
            })
            .map_err(|_| RemoteError::Closed)?;

        match rows.recv() {
            Ok(WorkerMessage::Described(columns)) => {
                self.stream = Some(Stream {
                    rows,
                    columns,
                    exhausted: false,
                });
                Ok(())
            }
            Ok(WorkerMessage::Failed(e)) => Err(e),
            Ok(_) => Err(RemoteError::Execute(
                "worker answered before describing the result".into(),
            )),
            // The worker dropped the request: the connection was closed
            Err(_) => Err(RemoteError::Closed),
        }
    }

    fn description(&self) -> RemoteResult<Vec<ColumnMeta>> {
        self.stream
            .as_ref()
            .map(|s| s.columns.clone())
            .ok_or(RemoteError::NotExecuted)
    }

    fn fetch_one(&mut self) -> RemoteResult<Option<Vec<RemoteValue>>> {
        let stream = self.stream.as_mut().ok_or(RemoteError::NotExecuted)?;
        if stream.exhausted {
            return Ok(None);
        }
        match stream.rows.recv() {
            Ok(WorkerMessage::Row(values)) => Ok(Some(values)),
            Ok(WorkerMessage::Done) => {
                stream.exhausted = true;
                Ok(None)
            }
            Ok(WorkerMessage::Failed(e)) => {
                stream.exhausted = true;
                Err(e)
            }
            Ok(WorkerMessage::Described(_)) => {
                stream.exhausted = true;
                Err(RemoteError::Fetch("unexpected description message".into()))
            }
            Err(_) => {
                stream.exhausted = true;
                Err(RemoteError::Fetch("connection worker stopped mid-result".into()))
            }
        }
    }

    fn close(&mut self) {
        // Dropping the receiver tells the worker to abandon the result
        self.stream = None;
    }
}

fn stream_rows(
    conn: &Connection,
    sql: &str,
    bound: Vec<Value>,
    tx: &Sender<WorkerMessage>,
) -> RemoteResult<()> {
    let mut stmt = conn.prepare(sql)?;

    let columns: Vec<ColumnMeta> = stmt
        .columns()
        .iter()
        .map(|c| describe_column(c.name(), c.decl_type()))
        .collect();
    let codes: Vec<Option<SqlTypeCode>> = columns
        .iter()
        .map(|c| match c.type_indicator {
            TypeIndicator::Declared(code) => Some(code),
            _ => None,
        })
        .collect();

    if tx.send(WorkerMessage::Described(columns)).is_err() {
        return Ok(());
    }

    let mut rows = stmt.query(params_from_iter(bound))?;
    loop {
        let row = match rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => return Err(RemoteError::Fetch(e.to_string())),
        };

        let mut values = Vec::with_capacity(codes.len());
        for (i, code) in codes.iter().enumerate() {
            let raw = row
                .get_ref(i)
                .map_err(|e| RemoteError::Fetch(e.to_string()))?;
            values.push(convert_value(raw, *code));
        }

        if tx.send(WorkerMessage::Row(values)).is_err() {
            // Cursor closed mid-result
            return Ok(());
        }
    }

    let _ = tx.send(WorkerMessage::Done);
    Ok(())
}

/// Builds column metadata from a declared SQLite column type
pub(crate) fn describe_column(name: &str, decl_type: Option<&str>) -> ColumnMeta {
    match decl_type {
        Some(decl) => {
            let (code, precision, scale) = parse_decl_type(decl);
            ColumnMeta::declared(name, code).with_precision(precision, scale)
        }
        None => ColumnMeta::untyped(name),
    }
}

/// Splits `NAME(p,s)` into a type code, precision and scale.
///
/// Name matching follows SQLite's affinity rules, extended with the
/// decimal and date/time families.
pub(crate) fn parse_decl_type(decl: &str) -> (SqlTypeCode, Option<u32>, Option<u32>) {
    let upper = decl.trim().to_ascii_uppercase();
    let (base, args) = match upper.split_once('(') {
        Some((base, rest)) => (base.trim(), rest.trim_end_matches(')')),
        None => (upper.as_str(), ""),
    };

    let mut sizes = args.split(',').map(|s| s.trim().parse::<u32>().ok());
    let precision = sizes.next().flatten();
    let scale = sizes.next().flatten();

    let code = if base.contains("DATE") || base.contains("TIME") {
        SqlTypeCode::DateTime
    } else if base.starts_with("DEC") {
        SqlTypeCode::Decimal
    } else if base.starts_with("NUMBER") || base.starts_with("NUMERIC") || base.contains("INT") {
        SqlTypeCode::Number
    } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        SqlTypeCode::Float
    } else if base.contains("BLOB") || base.contains("BINARY") {
        SqlTypeCode::Binary
    } else if base == "ROWID" {
        SqlTypeCode::RowId
    } else {
        SqlTypeCode::String
    };

    (code, precision, scale)
}

fn convert_value(raw: ValueRef<'_>, code: Option<SqlTypeCode>) -> RemoteValue {
    match raw {
        ValueRef::Null => RemoteValue::Null,
        ValueRef::Integer(i) => match code {
            Some(SqlTypeCode::Decimal) => RemoteValue::Decimal(Decimal::from(i)),
            _ => RemoteValue::Integer(i),
        },
        ValueRef::Real(f) => match code {
            Some(SqlTypeCode::Decimal) => Decimal::from_f64(f)
                .map(RemoteValue::Decimal)
                .unwrap_or(RemoteValue::Real(f)),
            _ => RemoteValue::Real(f),
        },
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => convert_text(text, code),
            Err(_) => RemoteValue::Opaque {
                type_name: "text (invalid utf-8)".into(),
            },
        },
        ValueRef::Blob(bytes) => RemoteValue::Blob(bytes.to_vec()),
    }
}

fn convert_text(text: &str, code: Option<SqlTypeCode>) -> RemoteValue {
    let parsed = match code {
        Some(SqlTypeCode::DateTime) => parse_temporal(text),
        Some(SqlTypeCode::Decimal) => text.trim().parse::<Decimal>().ok().map(RemoteValue::Decimal),
        _ => None,
    };
    parsed.unwrap_or_else(|| RemoteValue::Text(text.to_string()))
}

fn parse_temporal(text: &str) -> Option<RemoteValue> {
    let text = text.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(RemoteValue::DateTime(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(RemoteValue::Date(date));
    }
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .ok()
        .map(RemoteValue::Time)
}

fn to_sql_value(value: &RemoteValue) -> Value {
    match value {
        RemoteValue::Null | RemoteValue::Opaque { .. } => Value::Null,
        RemoteValue::Bool(b) => Value::Integer(i64::from(*b)),
        RemoteValue::Integer(i) => Value::Integer(*i),
        RemoteValue::Real(f) => Value::Real(*f),
        RemoteValue::Decimal(d) => d
            .to_f64()
            .map(Value::Real)
            .unwrap_or_else(|| Value::Text(d.to_string())),
        RemoteValue::Text(s) => Value::Text(s.clone()),
        RemoteValue::Blob(b) => Value::Blob(b.clone()),
        RemoteValue::DateTime(dt) => Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        RemoteValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        RemoteValue::Time(t) => Value::Text(t.format("%H:%M:%S").to_string()),
    }
}
