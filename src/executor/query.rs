//! Remote query construction
//!
//! Turns plan terms and host-bound arguments into one remote statement:
//!
//! ```text
//! select t.* from <source> t [where <col> <op> ? (or|and) ...]
//! ```
//!
//! Arguments are bound positionally in term order. Unary tests
//! (`is null`, `is not null`) render without a placeholder and the value
//! the host bound for them is dropped.

use crate::driver::RemoteValue;
use crate::planner::PlanTerm;
use crate::schema::{quote_identifier, TableDescriptor};

use super::errors::{ExecutorError, ExecutorResult};

/// A statement ready for a remote cursor
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteQuery {
    pub sql: String,
    pub params: Vec<RemoteValue>,
}

impl RemoteQuery {
    /// Builds the remote statement for `terms` bound to `args`.
    ///
    /// Each term must name the column at its ordinal, and `args` must hold
    /// exactly one value per term.
    pub fn build(
        table: &TableDescriptor,
        terms: &[PlanTerm],
        args: &[RemoteValue],
    ) -> ExecutorResult<Self> {
        if terms.len() != args.len() {
            return Err(ExecutorError::plan_mismatch(format!(
                "Plan has {} terms but {} arguments were bound",
                terms.len(),
                args.len()
            )));
        }

        let mut sql = format!("select t.* from {}", table.source().from_clause());
        if terms.is_empty() {
            return Ok(Self {
                sql,
                params: Vec::new(),
            });
        }

        let mut clauses = Vec::with_capacity(terms.len());
        let mut params = Vec::with_capacity(args.len());
        for (term, arg) in terms.iter().zip(args) {
            let declared = table.column(term.ordinal).ok_or_else(|| {
                ExecutorError::plan_mismatch(format!(
                    "Plan term references column {} of a {}-column table",
                    term.ordinal,
                    table.columns().len()
                ))
            })?;
            if declared.name != term.column {
                return Err(ExecutorError::plan_mismatch(format!(
                    "Plan term names '{}' but column {} is '{}'",
                    term.column, term.ordinal, declared.name
                )));
            }

            let column = column_ref(&term.column);
            if term.comparator.takes_argument() {
                clauses.push(format!("{} {} ?", column, term.comparator.sql()));
                params.push(arg.clone());
            } else {
                clauses.push(format!("{} {}", column, term.comparator.sql()));
            }
        }

        let joiner = format!(" {} ", table.combinator().keyword());
        sql.push_str(" where ");
        sql.push_str(&clauses.join(&joiner));
        Ok(Self { sql, params })
    }
}

/// Bare name for plain identifiers, quoted otherwise
fn column_ref(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        quote_identifier(name)
    }
}
