//! Coercion error types
//!
//! Error codes:
//! - REMOTABLE_COERCION_FAILED (RECOVERED)
//!
//! Coercion errors never abort iteration. The offending cell becomes NULL
//! and a diagnostic is recorded.

use std::fmt;

/// Coercion error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionErrorCode {
    /// Remote type has no host representation
    RemotableUnsupportedType,
    /// Value could not be converted to its host kind
    RemotableCoercionFailed,
}

impl CoercionErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CoercionErrorCode::RemotableUnsupportedType => "REMOTABLE_UNSUPPORTED_TYPE",
            CoercionErrorCode::RemotableCoercionFailed => "REMOTABLE_COERCION_FAILED",
        }
    }
}

impl fmt::Display for CoercionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A cell-level coercion failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    code: CoercionErrorCode,
    type_name: String,
    message: String,
}

impl CoercionError {
    /// The remote value's type has no host representation
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            code: CoercionErrorCode::RemotableUnsupportedType,
            message: format!("Remote type '{}' has no host representation", type_name),
            type_name,
        }
    }

    /// The value could not be converted
    pub fn conversion_failed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: CoercionErrorCode::RemotableCoercionFailed,
            type_name: type_name.into(),
            message: reason.into(),
        }
    }

    pub fn code(&self) -> CoercionErrorCode {
        self.code
    }

    /// Remote type name of the offending value
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[RECOVERED] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CoercionError {}

/// Result type for coercion
pub type CoercionResult<T> = Result<T, CoercionError>;
