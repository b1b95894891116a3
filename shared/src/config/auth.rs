//! Authentication and token configuration

use serde::{Deserialize, Serialize};

/// Default access-domain secret (development only)
pub const DEFAULT_ACCESS_SECRET: &str = "development-access-secret-change-in-production";

/// Default refresh-domain secret (development only)
pub const DEFAULT_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";

/// Longest accepted token lifetime in seconds (ten years)
pub const MAX_TOKEN_EXPIRY_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// JWT signing configuration
///
/// Access and refresh tokens are signed with independent secrets so that a token
/// from one domain never verifies in the other.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for the access-token signing domain
    pub access_secret: String,

    /// Secret for the refresh-token signing domain
    pub refresh_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604800,  // 7 days
            issuer: String::from("tokengate"),
            audience: String::from("tokengate-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with both domain secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if either domain still uses its default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }
}

/// Session housekeeping configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// How often expired token families are swept, in seconds
    pub sweep_interval_seconds: u64,

    /// bcrypt cost factor for password hashing
    pub bcrypt_cost: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: 3600,
            bcrypt_cost: 10,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let access_secret = std::env::var("JWT_SECRET")
            .unwrap_or(defaults.access_secret);
        let refresh_secret = std::env::var("REFRESH_SECRET")
            .unwrap_or(defaults.refresh_secret);
        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.access_token_expiry);
        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.refresh_token_expiry);

        let session_defaults = SessionConfig::default();
        let sweep_interval_seconds = std::env::var("TOKEN_SWEEP_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(session_defaults.sweep_interval_seconds);
        let bcrypt_cost = std::env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(session_defaults.bcrypt_cost);

        Self {
            jwt: JwtConfig {
                access_secret,
                refresh_secret,
                access_token_expiry,
                refresh_token_expiry,
                ..defaults
            },
            session: SessionConfig {
                sweep_interval_seconds,
                bcrypt_cost,
            },
        }
    }
}
