use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tg_core::domain::entities::token::{SessionSummary, TokenPair};
use tg_core::domain::value_objects::UserSummary;

// Request fields default to empty so a missing field fails validation with a 400
// instead of a deserialization error.

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: String,
    /// Scope patterns; absent or empty binds the pair to the login address
    #[serde(default)]
    pub allowed_ips: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: UserSummary,
    pub ip: String,
    pub allowed_ips: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub ip: String,
    pub allowed_ips: Vec<String>,
}

impl RefreshResponse {
    pub fn from_pair(pair: TokenPair) -> Self {
        Self {
            success: true,
            message: "Tokens refreshed".to_string(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            token_type: pair.token_type,
            ip: pair.origin_ip,
            allowed_ips: pair.allowed_scopes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Identity of the caller as seen by protected routes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedResponse {
    pub success: bool,
    pub message: String,
    pub user: CallerIdentity,
    pub client_ip: String,
    pub allowed_ips: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub current_ip: String,
    pub allowed_ips: Vec<String>,
    pub active_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: Profile,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub username: String,
    pub ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicResponse {
    pub success: bool,
    pub message: String,
    pub authenticated: bool,
    pub user: Option<PublicUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardingHeaders {
    #[serde(rename = "x-forwarded-for")]
    pub x_forwarded_for: Option<String>,
    #[serde(rename = "x-real-ip")]
    pub x_real_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub success: bool,
    pub client_ip: String,
    pub headers: ForwardingHeaders,
}
