//! Introspection error types
//!
//! Error codes:
//! - REMOTABLE_INTROSPECTION_FAILED (FATAL)
//! - REMOTABLE_UNKNOWN_DRIVER (FATAL)
//! - REMOTABLE_CONFIG_INVALID (FATAL)
//! - REMOTABLE_SCHEMA_INVALID (FATAL)
//!
//! All of them are fatal to table creation: no table is registered and no
//! partial schema reaches the host engine.

use std::fmt;

use crate::driver::RemoteError;

/// Introspection error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrospectionErrorCode {
    /// Remote connect or probe query failed
    RemotableIntrospectionFailed,
    /// No driver registered under the requested tag
    RemotableUnknownDriver,
    /// Table arguments or options are malformed
    RemotableConfigInvalid,
    /// Probe result cannot be declared as a host table
    RemotableSchemaInvalid,
}

impl IntrospectionErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IntrospectionErrorCode::RemotableIntrospectionFailed => {
                "REMOTABLE_INTROSPECTION_FAILED"
            }
            IntrospectionErrorCode::RemotableUnknownDriver => "REMOTABLE_UNKNOWN_DRIVER",
            IntrospectionErrorCode::RemotableConfigInvalid => "REMOTABLE_CONFIG_INVALID",
            IntrospectionErrorCode::RemotableSchemaInvalid => "REMOTABLE_SCHEMA_INVALID",
        }
    }
}

impl fmt::Display for IntrospectionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Introspection error with its remote cause, if any
#[derive(Debug, Clone)]
pub struct IntrospectionError {
    code: IntrospectionErrorCode,
    message: String,
    cause: Option<RemoteError>,
}

impl IntrospectionError {
    /// Remote connection could not be opened
    pub fn connect_failed(cause: RemoteError) -> Self {
        Self {
            code: IntrospectionErrorCode::RemotableIntrospectionFailed,
            message: "Remote connection failed".into(),
            cause: Some(cause),
        }
    }

    /// Zero-row probe query failed
    pub fn probe_failed(cause: RemoteError) -> Self {
        Self {
            code: IntrospectionErrorCode::RemotableIntrospectionFailed,
            message: "Remote schema probe failed".into(),
            cause: Some(cause),
        }
    }

    /// No driver under this tag
    pub fn unknown_driver(tag: &str, known: &[&str]) -> Self {
        Self {
            code: IntrospectionErrorCode::RemotableUnknownDriver,
            message: format!(
                "No remote driver registered as '{}' (known: {})",
                tag,
                known.join(", ")
            ),
            cause: None,
        }
    }

    /// Malformed table arguments or options
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: IntrospectionErrorCode::RemotableConfigInvalid,
            message: reason.into(),
            cause: None,
        }
    }

    /// Probe produced columns the host cannot declare
    pub fn schema_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: IntrospectionErrorCode::RemotableSchemaInvalid,
            message: reason.into(),
            cause: None,
        }
    }

    pub fn code(&self) -> IntrospectionErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying driver failure
    pub fn cause(&self) -> Option<&RemoteError> {
        self.cause.as_ref()
    }
}

impl fmt::Display for IntrospectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code.code(), self.message)?;
        if let Some(ref cause) = self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for IntrospectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for introspection
pub type IntrospectionResult<T> = Result<T, IntrospectionError>;
