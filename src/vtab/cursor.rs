//! Virtual table cursor: adapts `RowCursor` to the host callbacks

use std::marker::PhantomData;
use std::os::raw::c_int;

use rusqlite::ffi;
use rusqlite::types::{Value, ValueRef};
use rusqlite::vtab::{Context, VTabCursor, Values};

use crate::driver::RemoteValue;
use crate::executor::{ExecutorError, RowCursor};
use crate::planner::{PlanTerm, PlanToken};

use super::module_error;
use super::table::RemoteTable;

/// Cursor handed to the host engine by xOpen
#[repr(C)]
pub struct RemoteTableCursor<'vtab> {
    /// Base class. Must be first.
    base: ffi::sqlite3_vtab_cursor,
    rows: RowCursor,
    phantom: PhantomData<&'vtab RemoteTable>,
}

impl<'vtab> RemoteTableCursor<'vtab> {
    pub(super) fn new(rows: RowCursor, phantom: PhantomData<&'vtab RemoteTable>) -> Self {
        Self {
            base: ffi::sqlite3_vtab_cursor::default(),
            rows,
            phantom,
        }
    }
}

/// Recovers plan terms from the identifier and token chosen by the host
fn plan_terms(idx_num: c_int, idx_str: Option<&str>) -> rusqlite::Result<Vec<PlanTerm>> {
    let terms = match idx_str {
        Some(token) => PlanToken::decode(token).map_err(module_error)?,
        None => Vec::new(),
    };
    if idx_num.count_ones() as usize != terms.len() {
        return Err(module_error(ExecutorError::plan_mismatch(format!(
            "Plan {} does not match token with {} terms",
            idx_num,
            terms.len()
        ))));
    }
    Ok(terms)
}

fn remote_value(value: ValueRef<'_>) -> RemoteValue {
    match value {
        ValueRef::Null => RemoteValue::Null,
        ValueRef::Integer(i) => RemoteValue::Integer(i),
        ValueRef::Real(f) => RemoteValue::Real(f),
        ValueRef::Text(t) => RemoteValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => RemoteValue::Blob(b.to_vec()),
    }
}

unsafe impl VTabCursor for RemoteTableCursor<'_> {
    fn filter(
        &mut self,
        idx_num: c_int,
        idx_str: Option<&str>,
        args: &Values<'_>,
    ) -> rusqlite::Result<()> {
        let terms = plan_terms(idx_num, idx_str)?;
        let bound: Vec<RemoteValue> = args.iter().map(remote_value).collect();
        self.rows.filter(&terms, &bound).map_err(module_error)
    }

    fn next(&mut self) -> rusqlite::Result<()> {
        self.rows.next().map(|_| ()).map_err(module_error)
    }

    fn eof(&self) -> bool {
        self.rows.eof()
    }

    fn column(&self, ctx: &mut Context, i: c_int) -> rusqlite::Result<()> {
        let value: Value = self.rows.column(i).map_err(module_error)?.into();
        ctx.set_result(&value)
    }

    fn rowid(&self) -> rusqlite::Result<i64> {
        Ok(self.rows.rowid())
    }
}
