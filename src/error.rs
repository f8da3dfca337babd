//! Error taxonomy shared by every layer of the allocation core.
//!
//! Each variant carries a human readable `message` and structured `details`
//! so callers (an HTTP layer, the admin CLI) can render the failure without
//! inspecting internals.

use serde::Serialize;
use serde_json::{Value, json};

/// Serializable error payload for callers that render errors as JSON.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The owner-supplied prefix contains a path separator or is too long.
    #[error("{message}")]
    InvalidPrefix { message: String, details: Value },

    /// Any other malformed caller input.
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The store rejected a write because of a uniqueness constraint.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// Database or transport failure.
    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },

    /// The allocation loop ran out of attempts.
    #[error("{message}")]
    ExhaustedNamespace { message: String, details: Value },

    /// The allocation deadline passed between two attempts.
    #[error("{message}")]
    DeadlineExceeded { message: String, details: Value },
}

impl AppError {
    pub fn invalid_prefix(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidPrefix {
            message: message.into(),
            details,
        }
    }
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }
    pub fn exhausted_namespace(message: impl Into<String>, details: Value) -> Self {
        Self::ExhaustedNamespace {
            message: message.into(),
            details,
        }
    }
    pub fn deadline_exceeded(message: impl Into<String>, details: Value) -> Self {
        Self::DeadlineExceeded {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidPrefix { .. } => "invalid_prefix",
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::StoreUnavailable { .. } => "store_unavailable",
            AppError::ExhaustedNamespace { .. } => "exhausted_namespace",
            AppError::DeadlineExceeded { .. } => "deadline_exceeded",
        }
    }

    /// Returns true when the caller sent bad input and retrying is pointless.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidPrefix { .. } | AppError::Validation { .. } | AppError::NotFound { .. }
        )
    }

    pub fn details(&self) -> &Value {
        match self {
            AppError::InvalidPrefix { details, .. }
            | AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Conflict { details, .. }
            | AppError::StoreUnavailable { details, .. }
            | AppError::ExhaustedNamespace { details, .. }
            | AppError::DeadlineExceeded { details, .. } => details,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details: self.details().clone(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        tracing::error!("Database error: {}", e);
        AppError::store_unavailable("Database error", json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            AppError::invalid_prefix("bad", json!({})).code(),
            "invalid_prefix"
        );
        assert_eq!(AppError::not_found("x", json!({})).code(), "not_found");
        assert_eq!(
            AppError::exhausted_namespace("x", json!({})).code(),
            "exhausted_namespace"
        );
        assert_eq!(
            AppError::deadline_exceeded("x", json!({})).code(),
            "deadline_exceeded"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(AppError::invalid_prefix("x", json!({})).is_client_error());
        assert!(AppError::bad_request("x", json!({})).is_client_error());
        assert!(AppError::not_found("x", json!({})).is_client_error());
        assert!(!AppError::store_unavailable("x", json!({})).is_client_error());
        assert!(!AppError::exhausted_namespace("x", json!({})).is_client_error());
        assert!(!AppError::conflict("x", json!({})).is_client_error());
    }

    #[test]
    fn test_to_error_info() {
        let err = AppError::not_found("Short URL not found", json!({ "short_id": "abc" }));
        let info = err.to_error_info();

        assert_eq!(info.code, "not_found");
        assert_eq!(info.message, "Short URL not found");
        assert_eq!(info.details["short_id"], "abc");
    }

    #[test]
    fn test_non_database_sqlx_error_maps_to_store_unavailable() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }
}
