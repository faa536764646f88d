//! Remote query execution
//!
//! Consumes plans and streams coerced rows to the host engine.
//!
//! # Execution flow
//!
//! 1. Validate plan terms against the table and bound arguments
//! 2. Render the remote statement with the table's combinator
//! 3. Create a remote cursor under the connection lock
//! 4. Fetch one row per host `next`
//! 5. Coerce cells on demand; coercion failures become NULL
//!
//! # Guarantees
//!
//! - Remote failures stop iteration and are reported, never truncated
//! - Remote cursors are closed on exhaustion, failure, close and drop

mod cursor;
mod errors;
mod query;

pub use cursor::{lock_connection, RowCursor, SharedConnection};
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use query::RemoteQuery;
