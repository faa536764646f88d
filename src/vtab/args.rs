//! `CREATE VIRTUAL TABLE` argument parsing
//!
//! ```sql
//! create virtual table orders using remotable(sqlite, orders, path='remote.db')
//! create virtual table recent using remotable('sqlite', 'select * from orders where id > 10', 'remote.db')
//! ```
//!
//! The host hands over module name, database name and table name, then
//! the module arguments split at top-level commas.

use crate::driver::{unquote, ConnectParams};
use crate::schema::{IntrospectionError, IntrospectionResult};

/// Leading arguments supplied by the host before the module arguments
const HOST_ARGS: usize = 3;

/// Parsed module arguments of one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableArgs {
    pub table_name: String,
    pub driver_tag: String,
    pub source_expr: String,
    pub params: ConnectParams,
}

impl TableArgs {
    /// Parses the raw argument list handed to xCreate/xConnect
    pub fn parse(args: &[&[u8]]) -> IntrospectionResult<Self> {
        let texts = args
            .iter()
            .map(|a| {
                std::str::from_utf8(a).map_err(|_| {
                    IntrospectionError::config_invalid("Table arguments must be valid UTF-8")
                })
            })
            .collect::<IntrospectionResult<Vec<&str>>>()?;

        if texts.len() < HOST_ARGS + 2 {
            return Err(IntrospectionError::config_invalid(
                "Expected arguments: remotable(<driver>, <source>, <connect params...>)",
            ));
        }

        let table_name = bare_or_unquoted(texts[2]);
        let driver_tag = bare_or_unquoted(texts[HOST_ARGS]);
        let source_expr = bare_or_unquoted(texts[HOST_ARGS + 1]);
        if driver_tag.is_empty() {
            return Err(IntrospectionError::config_invalid("Driver tag is empty"));
        }
        if source_expr.is_empty() {
            return Err(IntrospectionError::config_invalid("Source expression is empty"));
        }

        let params = ConnectParams::parse(texts[HOST_ARGS + 2..].iter().copied())
            .map_err(|e| IntrospectionError::config_invalid(e.to_string()))?;

        Ok(Self {
            table_name,
            driver_tag,
            source_expr,
            params,
        })
    }
}

fn bare_or_unquoted(text: &str) -> String {
    let trimmed = text.trim();
    unquote(trimmed).unwrap_or_else(|| trimmed.to_string())
}
