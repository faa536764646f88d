//! Index planner
//!
//! Decides which host predicates are pushed to the remote source.
//!
//! Algorithm:
//! 1. Keep usable predicates whose column is declared indexable
//! 2. Cost = sum of the indexable columns' costs, or `FULL_SCAN_COST`
//! 3. Identifier = OR of `1 << position` over kept positions
//! 4. Token = encoded (ordinal, column, operator) triples of kept predicates
//! 5. Kept positions are reported as consumed, in order
//! 6. Output ordering is never preserved
//!
//! Planning is deterministic and never fails.

use crate::schema::{Combinator, TableDescriptor};

use super::ast::{Comparator, Predicate};
use super::token::PlanToken;

/// Cost reported when nothing can be pushed down
pub const FULL_SCAN_COST: f64 = f64::MAX;

/// Highest predicate position that fits the identifier bitmask
pub const MAX_PUSHED_POSITION: usize = 30;

/// A predicate chosen for pushdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanTerm {
    pub ordinal: i32,
    pub column: String,
    pub comparator: Comparator,
}

/// The negotiated outcome of planning
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Pushed predicates, in host order
    pub terms: Vec<PlanTerm>,
    /// Host positions of the pushed predicates, parallel to `terms`
    pub consumed: Vec<usize>,
    /// Bitmask of consumed positions
    pub identifier: i32,
    /// Encoded terms, absent when nothing is pushed
    pub token: Option<String>,
    /// Larger is more expensive
    pub estimated_cost: f64,
    /// Always false: ORDER BY is never pushed
    pub order_preserved: bool,
    /// Whether the host may skip re-checking consumed predicates
    pub omit_consumed: bool,
}

impl Plan {
    /// True when no predicate is pushed
    pub fn is_full_scan(&self) -> bool {
        self.terms.is_empty()
    }

    /// 1-based argument slot for a host position, if consumed
    pub fn argv_index(&self, position: usize) -> Option<i32> {
        self.consumed
            .iter()
            .position(|&p| p == position)
            .and_then(|slot| i32::try_from(slot + 1).ok())
    }
}

/// Planner bound to one table
pub struct IndexPlanner<'a> {
    table: &'a TableDescriptor,
}

impl<'a> IndexPlanner<'a> {
    pub fn new(table: &'a TableDescriptor) -> Self {
        Self { table }
    }

    /// Plans a predicate list. Same input → same plan.
    pub fn plan(&self, predicates: &[Predicate]) -> Plan {
        let mut terms = Vec::new();
        let mut consumed = Vec::new();
        let mut identifier = 0i32;
        let mut cost = 0u64;

        for (position, predicate) in predicates.iter().enumerate() {
            let Some((term, column_cost)) = self.eligible(position, predicate) else {
                continue;
            };
            identifier |= 1 << position;
            cost += u64::from(column_cost);
            consumed.push(position);
            terms.push(term);
        }

        if terms.is_empty() {
            return Plan {
                terms,
                consumed,
                identifier: 0,
                token: None,
                estimated_cost: FULL_SCAN_COST,
                order_preserved: false,
                omit_consumed: false,
            };
        }

        Plan {
            token: Some(PlanToken::encode(&terms)),
            terms,
            consumed,
            identifier,
            estimated_cost: cost as f64,
            order_preserved: false,
            omit_consumed: self.table.combinator() == Combinator::And,
        }
    }

    /// Returns the term and its cost when the predicate can be pushed
    fn eligible(&self, position: usize, predicate: &Predicate) -> Option<(PlanTerm, u32)> {
        if !predicate.usable || position > MAX_PUSHED_POSITION {
            return None;
        }
        let comparator = predicate.comparator?;
        let column = self.table.column(predicate.ordinal)?;
        let cost = self.table.index_cost(&column.name)?;

        Some((
            PlanTerm {
                ordinal: predicate.ordinal,
                column: column.name.clone(),
                comparator,
            },
            cost,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::schema::{ColumnDescriptor, HostType, RemoteSource};

    fn orders(costs: &[(&str, u32)]) -> TableDescriptor {
        let costs: BTreeMap<String, u32> =
            costs.iter().map(|(c, v)| (c.to_string(), *v)).collect();
        TableDescriptor::new(
            "orders",
            RemoteSource::table("orders"),
            vec![
                ColumnDescriptor::new("id", HostType::Integer),
                ColumnDescriptor::new("customer_id", HostType::Integer),
                ColumnDescriptor::new("status", HostType::Text),
                ColumnDescriptor::new("total", HostType::Real),
            ],
        )
        .unwrap()
        .with_index_costs(costs)
    }

    #[test]
    fn test_single_indexed_equality() {
        let table = orders(&[("customer_id", 10)]);
        let plan = IndexPlanner::new(&table).plan(&[Predicate::new(1, Comparator::Eq)]);

        assert_eq!(plan.consumed, vec![0]);
        assert_eq!(plan.identifier, 1);
        assert_eq!(plan.estimated_cost, 10.0);
        assert_eq!(plan.token.as_deref(), Some(r#"[[1,"customer_id","="]]"#));
        assert!(!plan.order_preserved);
        assert_eq!(plan.argv_index(0), Some(1));
    }

    #[test]
    fn test_unindexed_column_is_full_scan() {
        let table = orders(&[("customer_id", 10)]);
        let plan = IndexPlanner::new(&table).plan(&[Predicate::new(2, Comparator::Eq)]);

        assert!(plan.is_full_scan());
        assert!(plan.consumed.is_empty());
        assert_eq!(plan.token, None);
        assert_eq!(plan.identifier, 0);
        assert_eq!(plan.estimated_cost, FULL_SCAN_COST);
    }

    #[test]
    fn test_no_predicates_is_full_scan() {
        let table = orders(&[("customer_id", 10)]);
        let plan = IndexPlanner::new(&table).plan(&[]);
        assert!(plan.is_full_scan());
        assert_eq!(plan.estimated_cost, FULL_SCAN_COST);
    }

    #[test]
    fn test_mixed_predicates_keep_positions() {
        let table = orders(&[("customer_id", 10), ("total", 3)]);
        let predicates = [
            Predicate::new(2, Comparator::Eq),
            Predicate::new(1, Comparator::Eq),
            Predicate::new(3, Comparator::Gt),
            Predicate::unusable(3, Some(Comparator::Lt)),
        ];
        let plan = IndexPlanner::new(&table).plan(&predicates);

        assert_eq!(plan.consumed, vec![1, 2]);
        assert_eq!(plan.identifier, 0b110);
        assert_eq!(plan.estimated_cost, 13.0);
        assert_eq!(plan.terms[0].column, "customer_id");
        assert_eq!(plan.terms[1].comparator, Comparator::Gt);
        assert_eq!(plan.argv_index(2), Some(2));
        assert_eq!(plan.argv_index(0), None);
        assert_eq!(plan.argv_index(3), None);
    }

    #[test]
    fn test_rowid_and_unmapped_operators_ignored() {
        let table = orders(&[("customer_id", 10)]);
        let predicates = [
            Predicate::new(-1, Comparator::Eq),
            Predicate {
                ordinal: 1,
                comparator: None,
                usable: true,
            },
        ];
        assert!(IndexPlanner::new(&table).plan(&predicates).is_full_scan());
    }

    #[test]
    fn test_positions_beyond_bitmask_ignored() {
        let table = orders(&[("customer_id", 1)]);
        let predicates: Vec<Predicate> = (0..40).map(|_| Predicate::new(1, Comparator::Eq)).collect();
        let plan = IndexPlanner::new(&table).plan(&predicates);
        assert_eq!(plan.consumed.len(), MAX_PUSHED_POSITION + 1);
        assert!(plan.identifier > 0);
    }

    #[test]
    fn test_combinator_controls_omit() {
        let predicates = [Predicate::new(1, Comparator::Eq)];

        let or_table = orders(&[("customer_id", 10)]);
        assert!(!IndexPlanner::new(&or_table).plan(&predicates).omit_consumed);

        let and_table = orders(&[("customer_id", 10)]).with_combinator(Combinator::And);
        assert!(IndexPlanner::new(&and_table).plan(&predicates).omit_consumed);
    }

    #[test]
    fn test_deterministic_planning() {
        let table = orders(&[("customer_id", 10), ("status", 4), ("total", 7)]);
        let predicates = [
            Predicate::new(3, Comparator::Le),
            Predicate::new(2, Comparator::Like),
            Predicate::new(0, Comparator::Eq),
        ];
        let planner = IndexPlanner::new(&table);
        let first = planner.plan(&predicates);
        for _ in 0..100 {
            assert_eq!(planner.plan(&predicates), first);
        }
    }

    #[test]
    fn test_token_round_trip() {
        let table = orders(&[("customer_id", 10), ("status", 4)]);
        let plan = IndexPlanner::new(&table).plan(&[
            Predicate::new(2, Comparator::IsNotNull),
            Predicate::new(1, Comparator::Ne),
        ]);
        let decoded = PlanToken::decode(plan.token.as_deref().unwrap()).unwrap();
        assert_eq!(decoded, plan.terms);
    }
}
