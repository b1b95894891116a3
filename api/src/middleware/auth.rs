//! IP-scoped authentication middleware for protecting API endpoints.
//!
//! The middleware extracts the bearer token from the Authorization header,
//! resolves the client address, and asks the session authority whether the
//! token is live, genuine, and presented from within its scopes. Accepted
//! requests carry an `AuthContext` in their extensions.
//!
//! The middleware works in two modes:
//! 1. Required: requests without an acceptable token are rejected
//! 2. Optional: the context is attached when the token is acceptable, and the
//!    request proceeds either way

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::AUTHORIZATION, StatusCode},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use tg_core::{
    domain::entities::token::Claims,
    errors::{AuthError, DomainError, TokenError},
    repositories::TokenRepository,
    services::SessionService,
};

use crate::dto::{ErrorResponse, RejectionResponse};
use crate::handlers::{internal_error_response, ApiError};
use crate::middleware::client_ip;

/// Authenticated caller injected into requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// User ID from the token subject
    pub user_id: Uuid,
    /// Username carried in the token
    pub username: String,
    /// Address the request was judged from
    pub client_ip: String,
    /// Scope patterns the token may be used from
    pub allowed_ips: Vec<String>,
    /// JWT ID of the presented token
    pub token_id: String,
}

impl AuthContext {
    /// Creates an authentication context from verified claims
    pub fn from_claims(claims: Claims, client_ip: String) -> Result<Self, DomainError> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidSignature))?;

        Ok(Self {
            user_id,
            username: claims.username,
            client_ip,
            allowed_ips: claims.allowed_ips,
            token_id: claims.jti,
        })
    }
}

/// Request-time check of an access token against the address it is used from
#[async_trait]
pub trait AccessValidator: Send + Sync {
    async fn validate_access(&self, token: &str, client_ip: &str) -> Result<Claims, DomainError>;
}

#[async_trait]
impl<T: TokenRepository + 'static> AccessValidator for SessionService<T> {
    async fn validate_access(&self, token: &str, client_ip: &str) -> Result<Claims, DomainError> {
        self.validate(token, client_ip).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Required,
    Optional,
}

/// IP-scoped authentication middleware factory
#[derive(Clone)]
pub struct IpScopedAuth {
    validator: Arc<dyn AccessValidator>,
    mode: AuthMode,
}

impl IpScopedAuth {
    /// Reject every request that does not present an acceptable token
    pub fn required(validator: Arc<dyn AccessValidator>) -> Self {
        Self {
            validator,
            mode: AuthMode::Required,
        }
    }

    /// Attach the caller when possible, never block
    pub fn optional(validator: Arc<dyn AccessValidator>) -> Self {
        Self {
            validator,
            mode: AuthMode::Optional,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }
}

impl<S, B> Transform<S, ServiceRequest> for IpScopedAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = IpScopedAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IpScopedAuthMiddleware {
            service: Rc::new(service),
            validator: Arc::clone(&self.validator),
            mode: self.mode,
        }))
    }
}

/// IP-scoped authentication middleware service
pub struct IpScopedAuthMiddleware<S> {
    service: Rc<S>,
    validator: Arc<dyn AccessValidator>,
    mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for IpScopedAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let validator = Arc::clone(&self.validator);
        let mode = self.mode;

        Box::pin(async move {
            let client_ip = client_ip::client_ip(req.request());

            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None if mode == AuthMode::Optional => {
                    return service.call(req).await.map(ServiceResponse::map_into_left_body);
                }
                None => {
                    let error = AuthError::MissingToken;
                    let response = ErrorResponse::new(error.to_string())
                        .with_code(error.code())
                        .to_response(StatusCode::UNAUTHORIZED);
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let outcome = validator
                .validate_access(&token, &client_ip)
                .await
                .and_then(|claims| AuthContext::from_claims(claims, client_ip.clone()));

            match outcome {
                Ok(context) => {
                    tracing::debug!(
                        user_id = %context.user_id,
                        client_ip = %context.client_ip,
                        "Request authenticated"
                    );
                    req.extensions_mut().insert(context);
                }
                Err(error) if mode == AuthMode::Optional => {
                    tracing::debug!(
                        client_ip = %client_ip,
                        code = error.code(),
                        "Optional authentication skipped"
                    );
                }
                Err(error) if error.is_internal() => {
                    tracing::error!(error = %error, "Authentication check failed");
                    return Ok(req
                        .into_response(internal_error_response())
                        .map_into_right_body());
                }
                Err(error) => {
                    tracing::warn!(
                        client_ip = %client_ip,
                        code = error.code(),
                        "Request rejected by authentication gateway"
                    );
                    let body = RejectionResponse {
                        error: ErrorResponse::new(error.to_string()).with_code(error.code()),
                        client_ip,
                    };
                    let response = actix_web::HttpResponse::Forbidden().json(body);
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::Domain(AuthError::MissingToken.into()));

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        ready(Ok(OptionalAuth(auth)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;
    use tg_core::domain::entities::token::{ClaimFields, TokenKind};

    #[test]
    fn test_extract_bearer_token() {
        let req = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();

        assert_eq!(extract_bearer_token(&req), Some("test_token_123".to_string()));

        let req_no_bearer = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_srv_request();

        assert_eq!(extract_bearer_token(&req_no_bearer), None);

        let req_empty = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_srv_request();

        assert_eq!(extract_bearer_token(&req_empty), None);

        let req_no_header = actix_test::TestRequest::default().to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_header), None);
    }

    #[test]
    fn test_context_from_claims() {
        let fields = ClaimFields {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            origin_ip: "10.0.0.5".to_string(),
            allowed_scopes: vec!["10.0.0.*".to_string()],
        };
        let claims = Claims::new(TokenKind::Access, &fields, 900);
        let jti = claims.jti.clone();

        let context = AuthContext::from_claims(claims, "10.0.0.9".to_string()).unwrap();
        assert_eq!(context.user_id, fields.user_id);
        assert_eq!(context.username, "alice");
        assert_eq!(context.client_ip, "10.0.0.9");
        assert_eq!(context.allowed_ips, fields.allowed_scopes);
        assert_eq!(context.token_id, jti);
    }
}
