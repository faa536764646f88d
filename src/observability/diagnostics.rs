//! Recovered-failure diagnostics
//!
//! Cells that could not be coerced are returned as NULL. Each such event is
//! recorded here so callers can inspect what was lost. The log is bounded:
//! once full, the oldest entry is dropped.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

/// Default number of retained diagnostics
pub const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 1024;

/// One recovered failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub table: String,
    pub column: String,
    pub rowid: i64,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} (row {}): {}",
            self.table, self.column, self.rowid, self.message
        )
    }
}

/// Bounded in-memory diagnostic log, cheap to clone
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    entries: Arc<Mutex<VecDeque<Diagnostic>>>,
    capacity: usize,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DIAGNOSTICS_CAPACITY)
    }
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero disables retention
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity,
        }
    }

    pub fn record(&self, diagnostic: Diagnostic) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(diagnostic);
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().iter().cloned().collect()
    }

    /// Removes and returns all retained entries
    pub fn drain(&self) -> Vec<Diagnostic> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned log is still readable; entries are plain data.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Diagnostic>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
