//! Planner error types
//!
//! Error codes:
//! - REMOTABLE_PLAN_TOKEN_INVALID (ERROR)
//!
//! Planning itself never fails: an unplannable predicate set degrades to a
//! full scan. Only decoding a plan token can go wrong.

use std::fmt;

/// Planner error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningErrorCode {
    /// Plan token is not a token this planner produced
    RemotablePlanTokenInvalid,
}

impl PlanningErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlanningErrorCode::RemotablePlanTokenInvalid => "REMOTABLE_PLAN_TOKEN_INVALID",
        }
    }
}

impl fmt::Display for PlanningErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error with context
#[derive(Debug, Clone)]
pub struct PlanningError {
    code: PlanningErrorCode,
    message: String,
    token: String,
}

impl PlanningError {
    /// Create a token invalid error
    pub fn token_invalid(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: PlanningErrorCode::RemotablePlanTokenInvalid,
            message: reason.into(),
            token: token.into(),
        }
    }

    pub fn code(&self) -> PlanningErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending token text
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ERROR] {}: {} (token: {})",
            self.code.code(),
            self.message,
            self.token
        )
    }
}

impl std::error::Error for PlanningError {}

/// Result type for planner operations
pub type PlanningResult<T> = Result<T, PlanningError>;
