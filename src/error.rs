//! Shared error vocabulary for services.
//!
//! Every service error enum implements [`ErrorCode`] so routes can turn it
//! into an HTTP status, a grepable code and a localized message without
//! matching on each service's variants.

use axum::http::StatusCode;

/// Validation failure on a single input field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn status(&self) -> StatusCode;

    /// Translation key of the user-facing notification.
    fn message_key(&self) -> &'static str {
        default_message_key(self.status())
    }

    fn retryable(&self) -> bool {
        false
    }
}

/// Generic notification for a status when a service has nothing more specific.
#[must_use]
pub fn default_message_key(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => "error_validation",
        StatusCode::UNAUTHORIZED => "error_unauthorized",
        StatusCode::FORBIDDEN => "error_forbidden",
        StatusCode::NOT_FOUND => "error_not_found",
        StatusCode::CONFLICT => "error_conflict",
        StatusCode::TOO_MANY_REQUESTS => "error_rate_limited",
        _ => "error_internal",
    }
}

impl ErrorCode for FieldError {
    fn error_code(&self) -> &'static str {
        "E_VALIDATION"
    }

    fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl ErrorCode for sqlx::Error {
    fn error_code(&self) -> &'static str {
        "E_DATABASE"
    }

    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Unique-constraint violation, used to map duplicate inserts to 409.
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
