//! Error types for `boostme`.
//!
//! Storage failures all collapse into [`BoostError::QueryExecution`], which
//! carries the message reported by the store. Callers that need to tell a
//! constraint violation from a connectivity loss inspect that message (see
//! [`BoostError::is_unique_violation`]).

use serde::Serialize;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = BoostError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BoostError {
    #[error("Error executing query: {message}")]
    QueryExecution { message: String },

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{0}")]
    NotFound(String),

    /// A listing matched nothing. Reported as not-found, but JSON output
    /// keeps the success envelope shape with empty `data`.
    #[error("{0}")]
    EmptyResult(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Stable, machine-readable error codes used in JSON error output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    QueryFailed,
    PoolUnavailable,
    InvalidConfig,
    InvalidInput,
    NotFound,
    Conflict,
    IoError,
    SerializationError,
}

impl BoostError {
    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryExecution {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::QueryExecution { .. } => ErrorCode::QueryFailed,
            Self::Pool(_) => ErrorCode::PoolUnavailable,
            Self::Config(_) => ErrorCode::InvalidConfig,
            Self::Validation { .. } => ErrorCode::InvalidInput,
            Self::NotFound(_) | Self::EmptyResult(_) => ErrorCode::NotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
        }
    }

    /// Process exit code for the CLI.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation { .. } => 2,
            Self::NotFound(_) | Self::EmptyResult(_) => 3,
            Self::Conflict(_) => 4,
            _ => 1,
        }
    }

    /// True when the store rejected a write because of a UNIQUE constraint.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::QueryExecution { message } if message.contains("UNIQUE constraint failed"))
    }
}

/// Error body emitted on stdout when `--json` is active.
#[derive(Debug, Serialize, schemars::JsonSchema)]
pub struct StructuredError {
    /// Machine-readable error code (SCREAMING_SNAKE_CASE)
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl From<&BoostError> for StructuredError {
    fn from(err: &BoostError) -> Self {
        let code = serde_json::to_value(err.code())
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        Self {
            code,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_carries_store_message() {
        let err = BoostError::query("no such table: nope");
        assert_eq!(err.to_string(), "Error executing query: no such table: nope");
        assert_eq!(err.code(), ErrorCode::QueryFailed);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unique_violation_is_detected_from_message() {
        let err = BoostError::query("UNIQUE constraint failed: clients.email");
        assert!(err.is_unique_violation());
        assert!(!BoostError::query("disk I/O error").is_unique_violation());
        assert!(!BoostError::Conflict("UNIQUE constraint failed".into()).is_unique_violation());
    }

    #[test]
    fn structured_error_uses_screaming_snake_codes() {
        let err = BoostError::NotFound("Challenge not found: 7".to_string());
        let body = StructuredError::from(&err);
        assert_eq!(body.code, "NOT_FOUND");
        assert_eq!(body.message, "Challenge not found: 7");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn empty_result_exits_as_not_found() {
        let err = BoostError::EmptyResult("No challenges found".to_string());
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "No challenges found");
    }
}
