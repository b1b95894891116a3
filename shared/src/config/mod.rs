//! Configuration module
//!
//! - `auth` - signing secrets, token lifetimes, session housekeeping
//! - `database` - MySQL connection pool configuration
//! - `environment` - environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, SessionConfig, MAX_TOKEN_EXPIRY_SECS};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration; `None` keeps all state in process memory
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: None,
            auth: AuthConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Check the configuration for settings that must not reach production
    pub fn validate(&self) -> Result<(), String> {
        let jwt = &self.auth.jwt;

        if jwt.access_secret.is_empty() || jwt.refresh_secret.is_empty() {
            return Err("JWT_SECRET and REFRESH_SECRET must not be empty".to_string());
        }
        if jwt.access_secret == jwt.refresh_secret {
            return Err("JWT_SECRET and REFRESH_SECRET must differ".to_string());
        }
        if jwt.access_token_expiry <= 0 || jwt.access_token_expiry >= jwt.refresh_token_expiry {
            return Err("access token expiry must be positive and shorter than refresh token expiry".to_string());
        }
        if jwt.refresh_token_expiry > MAX_TOKEN_EXPIRY_SECS {
            return Err(format!(
                "refresh token expiry must not exceed {} seconds",
                MAX_TOKEN_EXPIRY_SECS
            ));
        }
        if self.environment.is_production() && jwt.is_using_default_secret() {
            return Err("default signing secrets are not allowed in production".to_string());
        }

        Ok(())
    }
}
