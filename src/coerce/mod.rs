//! Type coercion from remote values to host scalars
//!
//! Coercion is pure: no I/O, no state. Failures are returned to the
//! caller, which nulls the cell and records a diagnostic.

mod coercer;
mod errors;
mod value;

pub use coercer::{TypeCoercer, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
pub use errors::{CoercionError, CoercionErrorCode, CoercionResult};
pub use value::HostValue;
