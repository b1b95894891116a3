//! Mapping of domain errors onto HTTP responses.
//!
//! Rejections keep the domain message and its stable code. Internal failures are
//! logged in full and answered with a generic body so storage details never reach
//! the client.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use tg_core::errors::{AuthError, DomainError, TokenError};

use crate::dto::ErrorResponse;

/// Message returned in place of any internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Code returned in place of any internal failure
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_ERROR";

const REQUIRED_FIELD_CODE: &str = "REQUIRED_FIELD";

/// Error type returned by route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(error) => status_for(error),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Domain(error) => handle_domain_error(error),
            ApiError::Validation(errors) => ErrorResponse::new(first_message(errors))
                .with_code(REQUIRED_FIELD_CODE)
                .to_response(StatusCode::BAD_REQUEST),
        }
    }
}

/// HTTP status for a domain error
///
/// Token errors map to 401 here; the authentication gateway answers its own
/// rejections with 403.
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Auth(AuthError::InvalidCredentials | AuthError::MissingToken) => {
            StatusCode::UNAUTHORIZED
        }
        DomainError::Auth(AuthError::UserAlreadyExists) => StatusCode::BAD_REQUEST,
        DomainError::Auth(AuthError::UserNotFound) => StatusCode::NOT_FOUND,
        DomainError::Token(TokenError::GenerationFailed) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::ValidationErr(_) | DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Configuration { .. } | DomainError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Convert a domain error into its HTTP response
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    let status = status_for(error);

    if status.is_server_error() {
        tracing::error!(error = %error, "Request failed with internal error");
        return internal_error_response();
    }

    tracing::debug!(code = error.code(), "Request rejected");
    ErrorResponse::new(error.to_string())
        .with_code(error.code())
        .to_response(status)
}

/// Generic 500 body
pub fn internal_error_response() -> HttpResponse {
    ErrorResponse::new(INTERNAL_ERROR_MESSAGE)
        .with_code(INTERNAL_ERROR_CODE)
        .to_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Message of the first failing field, in field-name order
fn first_message(errors: &validator::ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by_key(|(field, _)| **field);

    fields
        .into_iter()
        .flat_map(|(field, errors)| errors.iter().map(move |e| (field, e)))
        .next()
        .map(|(field, e)| match &e.message {
            Some(message) => message.to_string(),
            None => format!("Invalid value for field: {}", field),
        })
        .unwrap_or_else(|| "Invalid request".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use tg_core::errors::ValidationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&AuthError::UserAlreadyExists.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&TokenError::NotFound.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(
                &ValidationError::InvalidScopePattern {
                    pattern: "x".to_string()
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DomainError::Internal {
                message: "db down".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_internal_error_is_not_leaked() {
        let response = handle_domain_error(&DomainError::Internal {
            message: "connection refused at 10.0.0.3:3306".to_string(),
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["code"], INTERNAL_ERROR_CODE);
    }

    #[actix_web::test]
    async fn test_rejection_keeps_code() {
        let response = handle_domain_error(&TokenError::Expired.into());
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], "TOKEN_EXPIRED");
    }
}
