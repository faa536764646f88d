//! Host engine scalar values

use rusqlite::types::Value;

/// A value in the host engine's scalar type system
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<HostValue> for Value {
    fn from(value: HostValue) -> Self {
        match value {
            HostValue::Null => Value::Null,
            HostValue::Integer(i) => Value::Integer(i),
            HostValue::Real(f) => Value::Real(f),
            HostValue::Text(s) => Value::Text(s),
            HostValue::Blob(b) => Value::Blob(b),
        }
    }
}
