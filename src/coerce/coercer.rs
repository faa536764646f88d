//! Remote → host value coercion
//!
//! Mapping:
//! - datetime → `YYYY-MM-DD HH:MM:SS` text
//! - date → `YYYY-MM-DD` text
//! - time → `HH:MM:SS` text
//! - decimal → real (precision loss accepted)
//! - bool → integer 0/1
//! - everything else passes through unchanged

use rust_decimal::prelude::ToPrimitive;

use crate::driver::RemoteValue;

use super::errors::{CoercionError, CoercionResult};
use super::value::HostValue;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Stateless converter from remote values to host values
pub struct TypeCoercer;

impl TypeCoercer {
    /// Coerces a single remote value. Pure and deterministic.
    pub fn coerce(value: &RemoteValue) -> CoercionResult<HostValue> {
        match value {
            RemoteValue::Null => Ok(HostValue::Null),
            RemoteValue::Bool(b) => Ok(HostValue::Integer(i64::from(*b))),
            RemoteValue::Integer(i) => Ok(HostValue::Integer(*i)),
            RemoteValue::Real(f) => Ok(HostValue::Real(*f)),
            RemoteValue::Decimal(d) => d.to_f64().map(HostValue::Real).ok_or_else(|| {
                CoercionError::conversion_failed(
                    value.class_name(),
                    format!("Decimal {} does not fit a real", d),
                )
            }),
            RemoteValue::Text(s) => Ok(HostValue::Text(s.clone())),
            RemoteValue::Blob(b) => Ok(HostValue::Blob(b.clone())),
            RemoteValue::DateTime(dt) => Ok(HostValue::Text(dt.format(DATETIME_FORMAT).to_string())),
            RemoteValue::Date(d) => Ok(HostValue::Text(d.format(DATE_FORMAT).to_string())),
            RemoteValue::Time(t) => Ok(HostValue::Text(t.format(TIME_FORMAT).to_string())),
            RemoteValue::Opaque { type_name } => Err(CoercionError::unsupported_type(type_name)),
        }
    }
}
