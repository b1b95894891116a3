//! Configuration for the authentication service

use tg_shared::config::SessionConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// bcrypt cost factor used when hashing new passwords
    pub bcrypt_cost: u32,
    /// Whether to allow registration of new users
    pub allow_registration: bool,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allow_registration: true,
        }
    }
}

impl From<&SessionConfig> for AuthServiceConfig {
    fn from(session: &SessionConfig) -> Self {
        Self {
            bcrypt_cost: session.bcrypt_cost,
            ..Self::default()
        }
    }
}
