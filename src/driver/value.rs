//! Remote value representation
//!
//! Values as a remote driver hands them over, before coercion into the
//! host engine's scalar kinds.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// A single cell value produced by a remote driver
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteValue {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Real(f64),
    /// Arbitrary-precision decimal
    Decimal(Decimal),
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Blob(Vec<u8>),
    /// Date with time of day
    DateTime(NaiveDateTime),
    /// Date only
    Date(NaiveDate),
    /// Time of day only
    Time(NaiveTime),
    /// A value the driver could not represent
    Opaque {
        /// Driver-side type name
        type_name: String,
    },
}

impl RemoteValue {
    /// Runtime class name of the value, as used by type inference
    pub fn class_name(&self) -> &str {
        match self {
            RemoteValue::Null => "NoneType",
            RemoteValue::Bool(_) => "bool",
            RemoteValue::Integer(_) => "int",
            RemoteValue::Real(_) => "float",
            RemoteValue::Decimal(_) => "Decimal",
            RemoteValue::Text(_) => "str",
            RemoteValue::Blob(_) => "bytes",
            RemoteValue::DateTime(_) => "datetime",
            RemoteValue::Date(_) => "date",
            RemoteValue::Time(_) => "time",
            RemoteValue::Opaque { type_name } => type_name,
        }
    }
}

impl fmt::Display for RemoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteValue::Null => write!(f, "NULL"),
            RemoteValue::Bool(b) => write!(f, "{}", b),
            RemoteValue::Integer(i) => write!(f, "{}", i),
            RemoteValue::Real(r) => write!(f, "{}", r),
            RemoteValue::Decimal(d) => write!(f, "{}", d),
            RemoteValue::Text(s) => write!(f, "'{}'", s),
            RemoteValue::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
            RemoteValue::DateTime(dt) => write!(f, "{}", dt),
            RemoteValue::Date(d) => write!(f, "{}", d),
            RemoteValue::Time(t) => write!(f, "{}", t),
            RemoteValue::Opaque { type_name } => write!(f, "<{}>", type_name),
        }
    }
}

impl From<i64> for RemoteValue {
    fn from(v: i64) -> Self {
        RemoteValue::Integer(v)
    }
}

impl From<f64> for RemoteValue {
    fn from(v: f64) -> Self {
        RemoteValue::Real(v)
    }
}

impl From<&str> for RemoteValue {
    fn from(v: &str) -> Self {
        RemoteValue::Text(v.to_string())
    }
}

impl From<String> for RemoteValue {
    fn from(v: String) -> Self {
        RemoteValue::Text(v)
    }
}
