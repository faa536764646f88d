//! Metrics registry for remote tables
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by every table of one module registration
///
/// All counters use Relaxed ordering; readers only need eventual values.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Tables registered successfully
    tables_created: AtomicU64,
    /// Table registrations that failed
    tables_failed: AtomicU64,
    /// Plans negotiated with the host engine
    plans_built: AtomicU64,
    /// Plans that pushed nothing down
    full_scans_planned: AtomicU64,
    /// Cursors opened
    cursors_opened: AtomicU64,
    /// Rows fetched from remote sources
    rows_fetched: AtomicU64,
    /// Cells nulled because coercion failed
    coercion_failures: AtomicU64,
    /// Remote execute/fetch failures
    remote_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_tables_created(&self) {
        self.tables_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tables_failed(&self) {
        self.tables_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a plan, noting whether it is a full scan
    pub fn record_plan(&self, full_scan: bool) {
        self.plans_built.fetch_add(1, Ordering::Relaxed);
        if full_scan {
            self.full_scans_planned.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_cursors_opened(&self) {
        self.cursors_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rows_fetched(&self) {
        self.rows_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_coercion_failures(&self) {
        self.coercion_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_remote_failures(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tables_created: self.tables_created.load(Ordering::Relaxed),
            tables_failed: self.tables_failed.load(Ordering::Relaxed),
            plans_built: self.plans_built.load(Ordering::Relaxed),
            full_scans_planned: self.full_scans_planned.load(Ordering::Relaxed),
            cursors_opened: self.cursors_opened.load(Ordering::Relaxed),
            rows_fetched: self.rows_fetched.load(Ordering::Relaxed),
            coercion_failures: self.coercion_failures.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub tables_created: u64,
    pub tables_failed: u64,
    pub plans_built: u64,
    pub full_scans_planned: u64,
    pub cursors_opened: u64,
    pub rows_fetched: u64,
    pub coercion_failures: u64,
    pub remote_failures: u64,
}
