//! Error types for Greenpoint
//!
//! One enum for every failure a handler can surface. Each variant maps to an
//! HTTP status and a stable machine-readable code.

use hyper::StatusCode;
use mongodb::error::{ErrorKind, WriteFailure};

/// Mongo server error code for unique index violations
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Main error type for Greenpoint operations
#[derive(Debug, thiserror::Error)]
pub enum GreenpointError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GreenpointError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code returned to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Auth(_) => "INVALID_CREDENTIALS",
            Self::Database(_) => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// True when a Mongo error is a unique index violation
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

impl From<std::io::Error> for GreenpointError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for GreenpointError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("Invalid JSON: {}", err))
    }
}

impl From<hyper::Error> for GreenpointError {
    fn from(err: hyper::Error) -> Self {
        Self::BadRequest(format!("Failed to read body: {}", err))
    }
}

impl From<mongodb::error::Error> for GreenpointError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::oid::Error> for GreenpointError {
    fn from(err: bson::oid::Error) -> Self {
        Self::Validation(format!("Invalid id: {}", err))
    }
}

/// Result type alias for Greenpoint operations
pub type Result<T> = std::result::Result<T, GreenpointError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GreenpointError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GreenpointError::AlreadyExists("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GreenpointError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GreenpointError::Auth("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GreenpointError::Database("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(GreenpointError::Auth("x".into()).code(), "INVALID_CREDENTIALS");
        assert_eq!(GreenpointError::Database("x".into()).code(), "STORE_ERROR");
        assert_eq!(GreenpointError::NotFound("x".into()).code(), "NOT_FOUND");
    }

    #[test]
    fn test_invalid_object_id_is_validation() {
        let err: GreenpointError = bson::oid::ObjectId::parse_str("nope").unwrap_err().into();
        assert!(matches!(err, GreenpointError::Validation(_)));
    }
}
