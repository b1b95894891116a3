//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{AuthError, TokenError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Whether the error is an internal failure rather than a rejection of the caller
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DomainError::Internal { .. } | DomainError::Configuration { .. }
        )
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Configuration { .. } | DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Auth(e) => e.code(),
            DomainError::Token(e) => e.code(),
            DomainError::ValidationErr(e) => e.code(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
