//! Domain-specific error types for credential and token operations
//!
//! Every variant carries a stable machine-readable code (see `code()`) so the
//! presentation layer can map errors to responses without matching on message text.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User with this username already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Authentication token not provided")]
    MissingToken,
}

impl AuthError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::MissingToken => "MISSING_TOKEN",
        }
    }
}

/// Token lifecycle errors
///
/// Produced by the credential signer, the token store, and the session service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token kind does not match the expected kind")]
    WrongKind,

    #[error("Token not found or already revoked")]
    NotFound,

    #[error("Token revoked or expired")]
    Revoked,

    #[error("IP address does not match token scope")]
    IpMismatch,

    #[error("Token value already exists")]
    DuplicateToken,

    #[error("Token generation failed")]
    GenerationFailed,
}

impl TokenError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::InvalidSignature => "INVALID_SIGNATURE",
            TokenError::Expired => "TOKEN_EXPIRED",
            TokenError::WrongKind => "WRONG_TOKEN_KIND",
            TokenError::NotFound => "TOKEN_NOT_FOUND",
            TokenError::Revoked => "TOKEN_REVOKED",
            TokenError::IpMismatch => "IP_MISMATCH",
            TokenError::DuplicateToken => "DUPLICATE_TOKEN",
            TokenError::GenerationFailed => "TOKEN_GENERATION_FAILED",
        }
    }
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid length for field: {field} ({message})")]
    InvalidLength { field: String, message: String },

    #[error("Invalid format for field: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid IP scope pattern: {pattern}")]
    InvalidScopePattern { pattern: String },
}

impl ValidationError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::RequiredField { .. } => "REQUIRED_FIELD",
            ValidationError::InvalidLength { .. } => "INVALID_LENGTH",
            ValidationError::InvalidFormat { .. } => "INVALID_FORMAT",
            ValidationError::InvalidScopePattern { .. } => "INVALID_SCOPE_PATTERN",
        }
    }
}

impl From<tg_shared::validation::ValidationErrors> for ValidationError {
    fn from(errors: tg_shared::validation::ValidationErrors) -> Self {
        match errors.first() {
            Some(first) if first.code == "required" => ValidationError::RequiredField {
                field: first.field.clone(),
            },
            Some(first) if first.code == "length" => ValidationError::InvalidLength {
                field: first.field.clone(),
                message: first.message.clone(),
            },
            Some(first) => ValidationError::InvalidFormat {
                field: first.field.clone(),
            },
            None => ValidationError::InvalidFormat {
                field: "request".to_string(),
            },
        }
    }
}
