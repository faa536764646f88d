//! Configuration error types
//!
//! All configuration errors are FATAL: nothing is registered from an
//! invalid file.

use std::fmt;
use std::io;

/// Configuration error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    /// File could not be read
    RemotableConfigUnreadable,
    /// File parsed but holds invalid values
    RemotableConfigInvalid,
}

impl ConfigErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            Self::RemotableConfigUnreadable => "REMOTABLE_CONFIG_UNREADABLE",
            Self::RemotableConfigInvalid => "REMOTABLE_CONFIG_INVALID",
        }
    }
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    code: ConfigErrorCode,
    message: String,
}

impl ConfigError {
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self {
            code: ConfigErrorCode::RemotableConfigUnreadable,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: ConfigErrorCode::RemotableConfigInvalid,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ConfigErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        Self::unreadable(format!("Failed to read config: {}", e))
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid(format!("Invalid config JSON: {}", e))
    }
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
