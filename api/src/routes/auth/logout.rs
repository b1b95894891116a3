use actix_web::{web, HttpResponse};

use tg_core::repositories::{TokenRepository, UserRepository};

use crate::dto::MessageResponse;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /api/auth/logout
///
/// Revokes every token family of the caller. Requires authentication.
///
/// ## Errors
/// - 401 Unauthorized: missing bearer token
/// - 403 Forbidden: token revoked, invalid, or used from outside its scopes
pub async fn logout<U, T>(
    state: web::Data<AppState<U, T>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    state.session_service.revoke_all(auth.user_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")))
}
