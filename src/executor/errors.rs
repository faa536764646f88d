//! Executor error types
//!
//! Error codes:
//! - REMOTABLE_REMOTE_EXECUTION_FAILED (ERROR)
//! - REMOTABLE_PLAN_MISMATCH (ERROR)
//! - REMOTABLE_COLUMN_OUT_OF_RANGE (ERROR)
//!
//! Every executor error aborts the host statement. None of them is fatal
//! to the table: the next statement may open a fresh cursor.

use std::fmt;

use crate::driver::RemoteError;

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Remote execute or fetch failed mid-iteration
    RemotableRemoteExecutionFailed,
    /// Plan terms or bound arguments do not fit the table
    RemotablePlanMismatch,
    /// Host asked for a column the table does not have
    RemotableColumnOutOfRange,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::RemotableRemoteExecutionFailed => {
                "REMOTABLE_REMOTE_EXECUTION_FAILED"
            }
            ExecutorErrorCode::RemotablePlanMismatch => "REMOTABLE_PLAN_MISMATCH",
            ExecutorErrorCode::RemotableColumnOutOfRange => "REMOTABLE_COLUMN_OUT_OF_RANGE",
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug, Clone)]
pub struct ExecutorError {
    /// Error code
    code: ExecutorErrorCode,
    /// Human-readable message
    message: String,
    /// Driver failure, for remote execution errors
    cause: Option<RemoteError>,
}

impl ExecutorError {
    /// Create a remote execution error
    pub fn remote_failed(stage: &str, cause: RemoteError) -> Self {
        Self {
            code: ExecutorErrorCode::RemotableRemoteExecutionFailed,
            message: format!("Remote {} failed", stage),
            cause: Some(cause),
        }
    }

    /// Create a plan mismatch error
    pub fn plan_mismatch(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::RemotablePlanMismatch,
            message: reason.into(),
            cause: None,
        }
    }

    /// Create a column out of range error
    pub fn column_out_of_range(ordinal: i32, width: usize) -> Self {
        Self {
            code: ExecutorErrorCode::RemotableColumnOutOfRange,
            message: format!(
                "Column {} requested from a row of {} columns",
                ordinal, width
            ),
            cause: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the driver failure, if any
    pub fn cause(&self) -> Option<&RemoteError> {
        self.cause.as_ref()
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)?;
        if let Some(ref cause) = self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
