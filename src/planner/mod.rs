//! Index planner subsystem
//!
//! Negotiates which host predicates are evaluated remotely.
//!
//! # Design Principles
//!
//! - Deterministic: same predicates → same identifier, token and cost
//! - Binary: each predicate is pushed or not, no plan search
//! - Safe: a predicate the host re-checks is never lost
//!
//! The plan token round-trips: the cursor decodes the exact triples the
//! planner encoded.

mod ast;
mod errors;
mod planner;
mod token;

pub use ast::{Comparator, Predicate};
pub use errors::{PlanningError, PlanningErrorCode, PlanningResult};
pub use planner::{IndexPlanner, Plan, PlanTerm, FULL_SCAN_COST, MAX_PUSHED_POSITION};
pub use token::PlanToken;
