//! Remote driver boundary
//!
//! A remote source is reached through three capabilities:
//!
//! - `RemoteDriver`: connect with positional/keyword parameters
//! - `RemoteConnection`: create cursors, close
//! - `RemoteCursor`: execute a query with positional parameters, describe
//!   the result columns, fetch one row at a time
//!
//! Drivers are selected by tag from a static `DriverRegistry`; driver
//! identity is never resolved from arbitrary runtime strings.

mod errors;
mod params;
mod registry;
mod sqlite;
mod value;

pub use errors::{RemoteError, RemoteResult};
pub use params::{unquote, ConnectParams, Literal};
pub use registry::DriverRegistry;
pub use sqlite::SqliteDriver;
pub use value::RemoteValue;

/// Static SQL type tags reported in result metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlTypeCode {
    /// Character data
    String,
    /// Binary data
    Binary,
    /// Numeric, integral unless precision/scale are declared
    Number,
    /// Approximate floating point
    Float,
    /// Exact decimal
    Decimal,
    /// Date and/or time
    DateTime,
    /// Row identifier
    RowId,
}

/// How a remote column announces its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeIndicator {
    /// Static SQL type tag from the driver
    Declared(SqlTypeCode),
    /// Runtime class name of the values the column carries
    RuntimeClass(String),
    /// Nothing known
    Unknown,
}

/// Per-column result metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name as reported by the remote source
    pub name: String,
    /// Type indicator
    pub type_indicator: TypeIndicator,
    /// Declared precision, if any
    pub precision: Option<u32>,
    /// Declared scale, if any
    pub scale: Option<u32>,
}

impl ColumnMeta {
    /// Creates metadata with a declared SQL type and no precision/scale
    pub fn declared(name: impl Into<String>, code: SqlTypeCode) -> Self {
        Self {
            name: name.into(),
            type_indicator: TypeIndicator::Declared(code),
            precision: None,
            scale: None,
        }
    }

    /// Creates metadata carrying a runtime class name
    pub fn runtime(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_indicator: TypeIndicator::RuntimeClass(class.into()),
            precision: None,
            scale: None,
        }
    }

    /// Creates metadata with no type information
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_indicator: TypeIndicator::Unknown,
            precision: None,
            scale: None,
        }
    }

    /// Sets precision and scale
    pub fn with_precision(mut self, precision: Option<u32>, scale: Option<u32>) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }
}

/// A driver capable of opening remote connections
pub trait RemoteDriver: Send + Sync {
    /// Tag this driver is registered under
    fn tag(&self) -> &str;

    /// Opens a connection
    fn connect(&self, params: &ConnectParams) -> RemoteResult<Box<dyn RemoteConnection>>;
}

/// An open connection to a remote source
pub trait RemoteConnection: Send {
    /// Creates an independent cursor
    fn cursor(&self) -> RemoteResult<Box<dyn RemoteCursor>>;

    /// Releases the connection. Must tolerate repeated calls.
    fn close(&mut self);
}

/// A forward-only cursor over one executed remote query
pub trait RemoteCursor: Send {
    /// Executes `sql` with positional parameter values
    fn execute(&mut self, sql: &str, params: &[RemoteValue]) -> RemoteResult<()>;

    /// Metadata of the executed query's result columns
    fn description(&self) -> RemoteResult<Vec<ColumnMeta>>;

    /// Fetches the next row, `None` once the result is exhausted
    fn fetch_one(&mut self) -> RemoteResult<Option<Vec<RemoteValue>>>;

    /// Releases the cursor. Must tolerate repeated calls.
    fn close(&mut self);
}
