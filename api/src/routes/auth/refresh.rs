use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use tg_core::repositories::{TokenRepository, UserRepository};

use crate::dto::{RefreshResponse, RefreshTokenRequest};
use crate::handlers::ApiError;
use crate::middleware::client_ip;

use super::AppState;

/// Handler for POST /api/auth/refresh
///
/// Exchanges a refresh token for a new pair. The presented token is consumed.
///
/// # Request Body
///
/// ```json
/// { "refreshToken": "eyJ..." }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `refreshToken` missing
/// - 401 Unauthorized: token invalid, expired, already used, or presented from
///   outside its scopes
pub async fn refresh<U, T>(
    req: HttpRequest,
    state: web::Data<AppState<U, T>>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    request.validate()?;

    let client_ip = client_ip::client_ip(&req);
    let pair = state
        .session_service
        .refresh_pair(&request.refresh_token, &client_ip)
        .await?;

    Ok(HttpResponse::Ok().json(RefreshResponse::from_pair(pair)))
}
