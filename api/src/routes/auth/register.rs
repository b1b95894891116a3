use actix_web::{web, HttpResponse};
use validator::Validate;

use tg_core::domain::value_objects::UserSummary;
use tg_core::repositories::{TokenRepository, UserRepository};

use crate::dto::{RegisterRequest, RegisterResponse};
use crate::handlers::ApiError;

use super::AppState;

/// Handler for POST /api/auth/register
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "password": "secret1" }
/// ```
///
/// ## Success (201 Created)
/// ```json
/// { "success": true, "message": "User registered successfully",
///   "user": { "id": "...", "username": "alice" } }
/// ```
///
/// ## Errors
/// - 400 Bad Request: missing fields, password shorter than 6 characters,
///   or username already taken
pub async fn register<U, T>(
    state: web::Data<AppState<U, T>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    request.validate()?;

    let user = state
        .auth_service
        .register(&request.username, &request.password)
        .await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        success: true,
        message: "User registered successfully".to_string(),
        user: UserSummary::from(&user),
    }))
}
