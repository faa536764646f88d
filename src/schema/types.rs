//! Table schema types
//!
//! A `TableDescriptor` is built once at table registration and shared
//! read-only by every cursor opened against the table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{IntrospectionError, IntrospectionResult};

/// Host engine column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    Integer,
    Real,
    Text,
    Blob,
    Null,
}

impl HostType {
    /// Type name used in the declared schema
    pub fn sql_name(&self) -> &'static str {
        match self {
            HostType::Integer => "integer",
            HostType::Real => "real",
            HostType::Text => "text",
            HostType::Blob => "blob",
            HostType::Null => "",
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// Whether the source expression names a table or is a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Table,
    Query,
}

impl SourceKind {
    /// Guesses the kind from the expression text: `select`/`with` start a query
    pub fn infer(expr: &str) -> Self {
        let first_word = expr
            .trim_start()
            .trim_start_matches('(')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match first_word.as_str() {
            "select" | "with" => SourceKind::Query,
            _ => SourceKind::Table,
        }
    }
}

/// How pushed predicates are combined in the remote WHERE clause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Any pushed predicate may admit a row; the host re-checks every constraint
    #[default]
    Or,
    /// Every pushed predicate must hold; the host skips re-checking them
    And,
}

impl Combinator {
    pub fn keyword(&self) -> &'static str {
        match self {
            Combinator::Or => "or",
            Combinator::And => "and",
        }
    }
}

/// The remote query source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub kind: SourceKind,
    pub expr: String,
}

impl RemoteSource {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Table,
            expr: name.into(),
        }
    }

    pub fn query(sql: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Query,
            expr: sql.into(),
        }
    }

    /// FROM-clause fragment aliased as `t`
    pub fn from_clause(&self) -> String {
        match self.kind {
            SourceKind::Table => format!("{} t", self.expr.trim()),
            SourceKind::Query => format!("({}) t", self.expr.trim().trim_end_matches(';')),
        }
    }
}

/// One declared column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub host_type: HostType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, host_type: HostType) -> Self {
        Self {
            name: name.into(),
            host_type,
        }
    }
}

/// Immutable description of a registered remote table
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    name: String,
    source: RemoteSource,
    columns: Vec<ColumnDescriptor>,
    column_index: HashMap<String, usize>,
    index_costs: BTreeMap<String, u32>,
    combinator: Combinator,
}

impl TableDescriptor {
    /// Builds a descriptor; column names must be unique
    pub fn new(
        name: impl Into<String>,
        source: RemoteSource,
        columns: Vec<ColumnDescriptor>,
    ) -> IntrospectionResult<Self> {
        if columns.is_empty() {
            return Err(IntrospectionError::schema_invalid(
                "Remote source returned no columns",
            ));
        }

        let mut column_index = HashMap::with_capacity(columns.len());
        for (ordinal, column) in columns.iter().enumerate() {
            if column_index.insert(column.name.clone(), ordinal).is_some() {
                return Err(IntrospectionError::schema_invalid(format!(
                    "Remote source returns column '{}' more than once",
                    column.name
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            source,
            columns,
            column_index,
            index_costs: BTreeMap::new(),
            combinator: Combinator::default(),
        })
    }

    /// Sets the indexable columns and their relative costs
    pub fn with_index_costs(mut self, costs: BTreeMap<String, u32>) -> Self {
        self.index_costs = costs;
        self
    }

    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &RemoteSource {
        &self.source
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Column at an ordinal, `None` when out of range
    pub fn column(&self, ordinal: i32) -> Option<&ColumnDescriptor> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| self.columns.get(i))
    }

    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Cost of pushing a predicate on `column`; `None` means not indexable
    pub fn index_cost(&self, column: &str) -> Option<u32> {
        self.index_costs.get(column).copied()
    }

    pub fn index_costs(&self) -> &BTreeMap<String, u32> {
        &self.index_costs
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    /// Indexable columns that the remote source does not return
    pub fn unknown_index_columns(&self) -> Vec<&str> {
        self.index_costs
            .keys()
            .filter(|name| !self.column_index.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// `create table` statement declaring this table to the host engine
    pub fn schema_sql(&self) -> String {
        let defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let quoted = quote_identifier(&c.name);
                match c.host_type {
                    HostType::Null => quoted,
                    other => format!("{} {}", quoted, other.sql_name()),
                }
            })
            .collect();
        format!(
            "create table {} ({})",
            quote_identifier(&self.name),
            defs.join(", ")
        )
    }
}

/// Wraps an identifier in double quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
