//! # Remote Driver Errors

use thiserror::Error;

/// Result type for remote driver operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failures reported by a remote driver adapter
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Invalid connect parameters: {0}")]
    InvalidParams(String),

    #[error("Execute failed: {0}")]
    Execute(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Cursor has not executed a query")]
    NotExecuted,

    #[error("Connection is closed")]
    Closed,
}

impl RemoteError {
    /// True when the failure happened before any query ran
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, RemoteError::Connect(_) | RemoteError::InvalidParams(_))
    }
}

impl From<rusqlite::Error> for RemoteError {
    fn from(e: rusqlite::Error) -> Self {
        RemoteError::Execute(e.to_string())
    }
}
