//! Observability subsystem for remote tables
//!
//! Provides:
//! - Lifecycle events emitted through `tracing`
//! - Lock-free counters
//! - A bounded log of recovered failures
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. Deterministic field ordering
//!
//! # Usage
//!
//! ```ignore
//! use remotable::observability::{log_event_with_fields, Event, Telemetry};
//!
//! log_event_with_fields(Event::TableCreated, &[("table", "orders")]);
//!
//! let telemetry = Telemetry::new(1024);
//! telemetry.metrics.increment_rows_fetched();
//! ```

mod diagnostics;
mod events;
mod metrics;

pub use diagnostics::{Diagnostic, DiagnosticLog, DEFAULT_DIAGNOSTICS_CAPACITY};
pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing::Level;

/// Counters and diagnostics shared by every table of one registration
#[derive(Debug)]
pub struct Telemetry {
    pub metrics: MetricsRegistry,
    pub diagnostics: DiagnosticLog,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTICS_CAPACITY)
    }
}

impl Telemetry {
    pub fn new(diagnostics_capacity: usize) -> Self {
        Self {
            metrics: MetricsRegistry::new(),
            diagnostics: DiagnosticLog::with_capacity(diagnostics_capacity),
        }
    }

    /// Counts, logs and retains a nulled cell
    pub fn record_coercion_failure(&self, diagnostic: Diagnostic) {
        self.metrics.increment_coercion_failures();
        let rowid = diagnostic.rowid.to_string();
        log_event_with_fields(
            Event::CoercionFailed,
            &[
                ("table", &diagnostic.table),
                ("column", &diagnostic.column),
                ("rowid", &rowid),
                ("message", &diagnostic.message),
            ],
        );
        self.diagnostics.record(diagnostic);
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
///
/// Fields are rendered in alphabetical key order.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let rendered = render_fields(fields);
    let name = event.as_str();
    match event.level() {
        Level::ERROR => tracing::error!(target: "remotable", event = name, "{}", rendered),
        Level::WARN => tracing::warn!(target: "remotable", event = name, "{}", rendered),
        Level::INFO => tracing::info!(target: "remotable", event = name, "{}", rendered),
        Level::DEBUG => tracing::debug!(target: "remotable", event = name, "{}", rendered),
        _ => tracing::trace!(target: "remotable", event = name, "{}", rendered),
    }
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}
