//! Request-level error taxonomy.
//!
//! # Responsibilities
//! - Distinguish routing misses from application faults
//! - Separate expected user-facing errors from unexpected ones
//! - Tag storage connectivity failures for escalated logging
//!
//! # Design Decisions
//! - One error type crosses the whole pipeline; controllers and hooks
//!   propagate with `?` and the HTTP boundary maps to a response
//! - User errors are rendered but never logged as errors
//! - A fault aborts the current request only, never the process

use thiserror::Error;

/// Error raised anywhere between dispatch and response finalization.
#[derive(Debug, Error)]
pub enum AppError {
    /// No route matched, or the matched pattern rejected the method.
    /// Rendered as a 404 by the boundary handler.
    #[error("not found")]
    NotFound,

    /// Expected, user-facing error (validation failure, bad credentials).
    /// Rendered with its message and not logged as an error.
    #[error("{0}")]
    User(String),

    /// Document store connectivity or write failure. Logged at escalated
    /// severity by the boundary handler.
    #[error("storage failure: {0}")]
    Storage(#[from] mongodb::error::Error),

    /// Any other unexpected fault from a controller or hook.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn user(message: impl Into<String>) -> Self {
        AppError::User(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }

    /// True for errors the boundary renders without logging.
    pub fn is_expected(&self) -> bool {
        matches!(self, AppError::NotFound | AppError::User(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_classification() {
        assert!(AppError::NotFound.is_expected());
        assert!(AppError::user("duplicate username").is_expected());
        assert!(!AppError::internal("template engine panicked").is_expected());
    }

    #[test]
    fn test_user_error_message_passthrough() {
        let err = AppError::user("username is taken");
        assert_eq!(err.to_string(), "username is taken");
    }
}
