//! Per-table configuration
//!
//! Loaded once from a JSON file and validated before anything is
//! registered. Every field except the table map has a default.
//!
//! ```json
//! {
//!   "tables": {
//!     "orders": {
//!       "source_kind": "table",
//!       "index_costs": { "customer_id": 10 },
//!       "combinator": "or"
//!     }
//!   },
//!   "diagnostics_capacity": 1024,
//!   "setup": [
//!     "create virtual table orders using remotable(sqlite, orders, path='remote.db')"
//!   ]
//! }
//! ```

mod errors;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::DEFAULT_DIAGNOSTICS_CAPACITY;
use crate::schema::{Combinator, SourceKind};

pub use errors::{ConfigError, ConfigErrorCode, ConfigResult};

/// Options for one remote table, keyed by host table name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableOptions {
    /// Overrides source kind inference
    #[serde(default)]
    pub source_kind: Option<SourceKind>,

    /// Indexable columns and their relative pushdown costs
    #[serde(default)]
    pub index_costs: BTreeMap<String, u32>,

    /// How pushed predicates are combined remotely
    #[serde(default)]
    pub combinator: Combinator,
}

impl TableOptions {
    pub fn with_index_cost(mut self, column: impl Into<String>, cost: u32) -> Self {
        self.index_costs.insert(column.into(), cost);
        self
    }

    pub fn with_source_kind(mut self, kind: SourceKind) -> Self {
        self.source_kind = Some(kind);
        self
    }

    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Per-table options
    #[serde(default)]
    pub tables: BTreeMap<String, TableOptions>,

    /// Retained coercion diagnostics (optional, default 1024)
    #[serde(default = "default_diagnostics_capacity")]
    pub diagnostics_capacity: usize,

    /// Statements run against the host connection before a CLI query
    #[serde(default)]
    pub setup: Vec<String>,
}

fn default_diagnostics_capacity() -> usize {
    DEFAULT_DIAGNOSTICS_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tables: BTreeMap::new(),
            diagnostics_capacity: default_diagnostics_capacity(),
            setup: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        for (table, options) in &self.tables {
            if table.trim().is_empty() {
                return Err(ConfigError::invalid("Table names must not be empty"));
            }
            if options.index_costs.keys().any(|c| c.trim().is_empty()) {
                return Err(ConfigError::invalid(format!(
                    "Table '{}' declares an indexable column with an empty name",
                    table
                )));
            }
        }

        if self.setup.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::invalid("Setup statements must not be empty"));
        }

        Ok(())
    }

    /// Options for `table`, defaults when absent
    pub fn table(&self, table: &str) -> TableOptions {
        self.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn with_table(mut self, table: impl Into<String>, options: TableOptions) -> Self {
        self.tables.insert(table.into(), options);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert!(config.tables.is_empty());
        assert_eq!(config.diagnostics_capacity, DEFAULT_DIAGNOSTICS_CAPACITY);
        assert!(config.setup.is_empty());
    }

    #[test]
    fn test_table_options() {
        let config = Config::from_json(
            r#"{
                "tables": {
                    "orders": {
                        "index_costs": {"customer_id": 10, "id": 1},
                        "combinator": "and"
                    },
                    "recent": {"source_kind": "query"}
                }
            }"#,
        )
        .unwrap();

        let orders = config.table("orders");
        assert_eq!(orders.index_costs.get("customer_id"), Some(&10));
        assert_eq!(orders.combinator, Combinator::And);
        assert_eq!(orders.source_kind, None);

        let recent = config.table("recent");
        assert_eq!(recent.source_kind, Some(SourceKind::Query));
        assert_eq!(recent.combinator, Combinator::Or);

        assert_eq!(config.table("missing"), TableOptions::default());
    }

    #[test]
    fn test_invalid_json() {
        let err = Config::from_json("{ not json").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::RemotableConfigInvalid);
    }

    #[test]
    fn test_unknown_table_option_rejected() {
        assert!(Config::from_json(r#"{"tables": {"t": {"index_cost": {}}}}"#).is_err());
    }

    #[test]
    fn test_bad_combinator_rejected() {
        assert!(Config::from_json(r#"{"tables": {"t": {"combinator": "xor"}}}"#).is_err());
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(Config::from_json(r#"{"tables": {"": {}}}"#).is_err());
        assert!(Config::from_json(r#"{"tables": {"t": {"index_costs": {" ": 1}}}}"#).is_err());
        assert!(Config::from_json(r#"{"setup": [""]}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remotable.json");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"tables": {{"orders": {{"index_costs": {{"customer_id": 10}}}}}}}}"#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.table("orders").index_costs.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/remotable.json")).unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::RemotableConfigUnreadable);
    }
}
