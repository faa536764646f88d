//! Plan token encoding
//!
//! A plan token is a JSON array of `[ordinal, column, operator]` triples,
//! e.g. `[[1,"customer_id","="]]`. The host engine treats it as opaque and
//! hands it back at cursor-open time.

use super::ast::Comparator;
use super::errors::{PlanningError, PlanningResult};
use super::planner::PlanTerm;

/// Encoder/decoder for plan tokens
pub struct PlanToken;

impl PlanToken {
    /// Encodes terms in order
    pub fn encode(terms: &[PlanTerm]) -> String {
        let triples: Vec<(i32, &str, &str)> = terms
            .iter()
            .map(|t| (t.ordinal, t.column.as_str(), t.comparator.sql()))
            .collect();
        // Serializing tuples of ints and strings cannot fail
        serde_json::to_string(&triples).unwrap_or_default()
    }

    /// Decodes a token produced by `encode`
    pub fn decode(token: &str) -> PlanningResult<Vec<PlanTerm>> {
        let triples: Vec<(i32, String, String)> = serde_json::from_str(token)
            .map_err(|e| PlanningError::token_invalid(token, e.to_string()))?;

        triples
            .into_iter()
            .map(|(ordinal, column, op)| {
                let comparator = Comparator::from_sql(&op).ok_or_else(|| {
                    PlanningError::token_invalid(token, format!("unknown operator '{}'", op))
                })?;
                Ok(PlanTerm {
                    ordinal,
                    column,
                    comparator,
                })
            })
            .collect()
    }
}
