//! Static registry of remote driver adapters

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::sqlite::SqliteDriver;
use super::RemoteDriver;

/// Driver adapters keyed by tag
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<dyn RemoteDriver>>,
}

impl DriverRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in adapters
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SqliteDriver::new()));
        registry
    }

    /// Registers a driver under its own tag, replacing any previous one
    pub fn register(&mut self, driver: Arc<dyn RemoteDriver>) {
        self.drivers.insert(driver.tag().to_string(), driver);
    }

    /// Looks up a driver by tag
    pub fn get(&self, tag: &str) -> Option<Arc<dyn RemoteDriver>> {
        self.drivers.get(tag).cloned()
    }

    /// Registered tags in sorted order
    pub fn tags(&self) -> Vec<&str> {
        self.drivers.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
