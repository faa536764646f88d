//! Lazy row cursor over a remote source
//!
//! Lifecycle:
//! 1. `open` binds the cursor to a table and its shared connection
//! 2. `filter` builds the remote query, creates a remote cursor under the
//!    connection lock, executes, and buffers the first row
//! 3. `next` replaces the buffered row with the next remote row
//! 4. `close` releases the remote cursor; repeated calls are no-ops
//!
//! Row identifiers are a per-cursor sequence: 0 for the first row after
//! `filter`, incremented by every `next`. They are not stable across
//! re-filtering.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::coerce::{HostValue, TypeCoercer};
use crate::driver::{RemoteConnection, RemoteCursor, RemoteError, RemoteValue};
use crate::observability::{log_event_with_fields, Diagnostic, Event, Telemetry};
use crate::planner::PlanTerm;
use crate::schema::TableDescriptor;

use super::errors::{ExecutorError, ExecutorResult};
use super::query::RemoteQuery;

/// A remote connection shared by every cursor of one table
pub type SharedConnection = Arc<Mutex<Box<dyn RemoteConnection>>>;

/// Locks a shared connection. A poisoned lock still guards a usable handle.
pub fn lock_connection(
    connection: &SharedConnection,
) -> MutexGuard<'_, Box<dyn RemoteConnection>> {
    connection.lock().unwrap_or_else(|e| e.into_inner())
}

/// Per-cursor mutable state
#[derive(Debug, Clone, Default, PartialEq)]
struct CursorState {
    /// Buffered current row, `None` once exhausted
    row: Option<Vec<RemoteValue>>,
    /// Synthetic identifier of the buffered row
    rowid: i64,
}

/// Forward-only cursor streaming coerced rows from a remote source
pub struct RowCursor {
    table: Arc<TableDescriptor>,
    connection: SharedConnection,
    telemetry: Arc<Telemetry>,
    remote: Option<Box<dyn RemoteCursor>>,
    state: CursorState,
    closed: bool,
}

impl RowCursor {
    /// Opens a cursor; no remote work happens until `filter`
    pub fn open(
        table: Arc<TableDescriptor>,
        connection: SharedConnection,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        telemetry.metrics.increment_cursors_opened();
        log_event_with_fields(Event::CursorOpened, &[("table", table.name())]);
        Self {
            table,
            connection,
            telemetry,
            remote: None,
            state: CursorState::default(),
            closed: false,
        }
    }

    /// Executes the remote query for `terms` bound to `args`
    ///
    /// Any previous result is discarded. On failure the remote cursor is
    /// closed and the cursor reports end of data.
    pub fn filter(&mut self, terms: &[PlanTerm], args: &[RemoteValue]) -> ExecutorResult<()> {
        self.release_remote();
        self.state = CursorState::default();
        self.closed = false;

        let query = RemoteQuery::build(&self.table, terms, args)?;

        let remote = {
            let connection = lock_connection(&self.connection);
            connection.cursor()
        };
        let mut remote = remote.map_err(|e| self.fail("cursor", e))?;

        if let Err(e) = remote.execute(&query.sql, &query.params) {
            remote.close();
            return Err(self.fail("execute", e));
        }
        self.remote = Some(remote);

        let terms_count = terms.len().to_string();
        log_event_with_fields(
            Event::CursorFiltered,
            &[
                ("sql", &query.sql),
                ("table", self.table.name()),
                ("terms", &terms_count),
            ],
        );

        self.state.row = self.fetch()?;
        Ok(())
    }

    /// Advances one row and returns it, `None` at end of data
    pub fn next(&mut self) -> ExecutorResult<Option<&[RemoteValue]>> {
        if self.state.row.is_none() {
            return Ok(None);
        }
        self.state.row = self.fetch()?;
        self.state.rowid += 1;
        Ok(self.state.row.as_deref())
    }

    /// True when no row is buffered
    pub fn eof(&self) -> bool {
        self.state.row.is_none()
    }

    /// Coerced value of the buffered row at `ordinal`; -1 yields the rowid
    ///
    /// A value that cannot be coerced is returned as NULL and recorded as
    /// a diagnostic.
    pub fn column(&self, ordinal: i32) -> ExecutorResult<HostValue> {
        if ordinal == -1 {
            return Ok(HostValue::Integer(self.state.rowid));
        }
        let Some(column) = self.table.column(ordinal) else {
            return Err(ExecutorError::column_out_of_range(
                ordinal,
                self.table.columns().len(),
            ));
        };
        let Some(row) = self.state.row.as_ref() else {
            return Ok(HostValue::Null);
        };

        let Some(value) = usize::try_from(ordinal).ok().and_then(|i| row.get(i)) else {
            self.recover(
                &column.name,
                format!("Remote row has {} columns", row.len()),
            );
            return Ok(HostValue::Null);
        };

        match TypeCoercer::coerce(value) {
            Ok(host) => Ok(host),
            Err(e) => {
                self.recover(&column.name, e.to_string());
                Ok(HostValue::Null)
            }
        }
    }

    /// Synthetic identifier of the buffered row
    pub fn rowid(&self) -> i64 {
        self.state.rowid
    }

    /// Releases the remote cursor. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.release_remote();
        self.state.row = None;
        self.closed = true;
        let rowid = self.state.rowid.to_string();
        log_event_with_fields(
            Event::CursorClosed,
            &[("last_rowid", &rowid), ("table", self.table.name())],
        );
    }

    fn fetch(&mut self) -> ExecutorResult<Option<Vec<RemoteValue>>> {
        let Some(remote) = self.remote.as_mut() else {
            return Ok(None);
        };
        match remote.fetch_one() {
            Ok(Some(row)) => {
                self.telemetry.metrics.increment_rows_fetched();
                Ok(Some(row))
            }
            Ok(None) => {
                self.release_remote();
                Ok(None)
            }
            Err(e) => {
                self.release_remote();
                Err(self.fail("fetch", e))
            }
        }
    }

    fn release_remote(&mut self) {
        if let Some(mut remote) = self.remote.take() {
            remote.close();
        }
    }

    fn fail(&mut self, stage: &str, cause: RemoteError) -> ExecutorError {
        self.state.row = None;
        self.telemetry.metrics.increment_remote_failures();
        let error = ExecutorError::remote_failed(stage, cause);
        let message = error.to_string();
        log_event_with_fields(
            Event::CursorFailed,
            &[
                ("error", &message),
                ("stage", stage),
                ("table", self.table.name()),
            ],
        );
        error
    }

    fn recover(&self, column: &str, message: String) {
        self.telemetry.record_coercion_failure(Diagnostic {
            table: self.table.name().to_string(),
            column: column.to_string(),
            rowid: self.state.rowid,
            message,
        });
    }
}

impl Drop for RowCursor {
    fn drop(&mut self) {
        self.close();
    }
}
