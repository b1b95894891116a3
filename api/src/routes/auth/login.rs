use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use tg_core::repositories::{TokenRepository, UserRepository};

use crate::dto::{LoginRequest, LoginResponse};
use crate::handlers::ApiError;
use crate::middleware::client_ip;

use super::AppState;

/// Handler for POST /api/auth/login
///
/// Issues a pair bound to the caller's address, or to `allowedIps` when given.
/// Every pair the user held before is revoked.
///
/// ## Errors
/// - 400 Bad Request: missing fields or a malformed `allowedIps` entry
/// - 401 Unauthorized: unknown user or wrong password
pub async fn login<U, T>(
    req: HttpRequest,
    state: web::Data<AppState<U, T>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    request.validate()?;

    let client_ip = client_ip::client_ip(&req);
    let LoginRequest {
        username,
        password,
        allowed_ips,
    } = request.into_inner();

    let auth = state
        .auth_service
        .login(&username, &password, &client_ip, allowed_ips)
        .await?;

    let tokens = auth.tokens;
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        token_type: tokens.token_type,
        user: auth.user,
        ip: tokens.origin_ip,
        allowed_ips: tokens.allowed_scopes,
    }))
}
