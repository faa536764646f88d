//! Observable events for remote tables
//!
//! Events are explicit and typed; each maps to a stable name and a level.

use std::fmt;

use tracing::Level;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Module registered on a host connection
    ModuleRegistered,

    // Table lifecycle
    /// Table creation begins
    TableCreateStart,
    /// Remote schema discovered and table declared
    TableCreated,
    /// Table creation failed, nothing registered
    TableCreateFailed,
    /// Remote connection released
    TableDisconnected,

    // Planning
    /// Plan negotiated with the host engine
    PlanBuilt,

    // Cursors
    /// Cursor opened
    CursorOpened,
    /// Remote query executed for a cursor
    CursorFiltered,
    /// Remote execute or fetch failed
    CursorFailed,
    /// Cursor closed
    CursorClosed,

    // Values
    /// A cell could not be coerced and was nulled
    CoercionFailed,
}

impl Event {
    /// Returns the stable event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ModuleRegistered => "MODULE_REGISTERED",
            Event::TableCreateStart => "TABLE_CREATE_START",
            Event::TableCreated => "TABLE_CREATED",
            Event::TableCreateFailed => "TABLE_CREATE_FAILED",
            Event::TableDisconnected => "TABLE_DISCONNECTED",
            Event::PlanBuilt => "PLAN_BUILT",
            Event::CursorOpened => "CURSOR_OPENED",
            Event::CursorFiltered => "CURSOR_FILTERED",
            Event::CursorFailed => "CURSOR_FAILED",
            Event::CursorClosed => "CURSOR_CLOSED",
            Event::CoercionFailed => "COERCION_FAILED",
        }
    }

    /// Level the event is emitted at
    pub fn level(&self) -> Level {
        match self {
            Event::TableCreateFailed | Event::CursorFailed => Level::ERROR,
            Event::CoercionFailed => Level::WARN,
            Event::ModuleRegistered
            | Event::TableCreateStart
            | Event::TableCreated
            | Event::TableDisconnected => Level::INFO,
            Event::PlanBuilt
            | Event::CursorOpened
            | Event::CursorFiltered
            | Event::CursorClosed => Level::DEBUG,
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::TableCreateFailed | Event::CursorFailed | Event::CoercionFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ModuleRegistered,
            Event::TableCreateStart,
            Event::TableCreated,
            Event::TableCreateFailed,
            Event::TableDisconnected,
            Event::PlanBuilt,
            Event::CursorOpened,
            Event::CursorFiltered,
            Event::CursorFailed,
            Event::CursorClosed,
            Event::CoercionFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::TableCreateFailed.is_failure());
        assert!(Event::CoercionFailed.is_failure());
        assert!(!Event::TableCreated.is_failure());
        assert_eq!(Event::CursorFailed.level(), Level::ERROR);
        assert_eq!(Event::PlanBuilt.level(), Level::DEBUG);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::TableCreated), "TABLE_CREATED");
    }
}
