//! Routes exercising the authentication gateway

use actix_web::{web, HttpRequest, HttpResponse};

use tg_core::errors::{AuthError, DomainError};
use tg_core::repositories::{TokenRepository, UserRepository};

use crate::dto::{
    CallerIdentity, ForwardingHeaders, InfoResponse, Profile, ProfileResponse, ProtectedResponse,
    PublicResponse, PublicUser,
};
use crate::handlers::ApiError;
use crate::middleware::auth::{AuthContext, OptionalAuth};
use crate::middleware::client_ip::{self, X_FORWARDED_FOR, X_REAL_IP};

use super::AppState;

/// Handler for GET /api/protected
pub async fn protected(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(ProtectedResponse {
        success: true,
        message: "Access granted".to_string(),
        user: CallerIdentity {
            user_id: auth.user_id,
            username: auth.username,
        },
        client_ip: auth.client_ip,
        allowed_ips: auth.allowed_ips,
    })
}

/// Handler for GET /api/profile
///
/// The caller's account together with their live sessions, newest first.
pub async fn profile<U, T>(
    state: web::Data<AppState<U, T>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    let user = state
        .auth_service
        .users()
        .find_by_id(auth.user_id)
        .await?
        .ok_or(DomainError::Auth(AuthError::UserNotFound))?;

    let sessions = state.session_service.active_sessions(auth.user_id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        success: true,
        profile: Profile {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            current_ip: auth.client_ip,
            allowed_ips: auth.allowed_ips,
            active_sessions: sessions.len(),
        },
        sessions,
    }))
}

/// Handler for GET /api/public
pub async fn public(auth: OptionalAuth) -> HttpResponse {
    let user = auth.0.map(|context| PublicUser {
        username: context.username,
        ip: context.client_ip,
    });

    HttpResponse::Ok().json(PublicResponse {
        success: true,
        message: "Public route".to_string(),
        authenticated: user.is_some(),
        user,
    })
}

/// Handler for GET /api/info
///
/// Reports the resolved client address and the forwarding headers it came from.
pub async fn info(req: HttpRequest) -> HttpResponse {
    let headers = req.headers();

    HttpResponse::Ok().json(InfoResponse {
        success: true,
        client_ip: client_ip::client_ip(&req),
        headers: ForwardingHeaders {
            x_forwarded_for: client_ip::header_str(headers, X_FORWARDED_FOR).map(str::to_string),
            x_real_ip: client_ip::header_str(headers, X_REAL_IP).map(str::to_string),
        },
    })
}
