//! Configuration for the credential signer

use jsonwebtoken::Algorithm;
use tg_shared::config::JwtConfig;

use crate::domain::entities::token::{
    TokenKind, ACCESS_TOKEN_EXPIRY_SECONDS, JWT_AUDIENCE, JWT_ISSUER,
    REFRESH_TOKEN_EXPIRY_SECONDS,
};

/// Configuration for the credential signer
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Secret for the access-token signing domain
    pub access_secret: String,
    /// Secret for the refresh-token signing domain
    pub refresh_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_token_expiry_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry_seconds: i64,
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
}

impl TokenServiceConfig {
    /// Lifetime of tokens of the given kind, in seconds
    pub fn ttl_for(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_token_expiry_seconds,
            TokenKind::Refresh => self.refresh_token_expiry_seconds,
        }
    }

    /// Secret of the given signing domain
    pub fn secret_for(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            access_secret: jwt.access_secret.clone(),
            refresh_secret: jwt.refresh_secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_expiry_seconds: jwt.access_token_expiry,
            refresh_token_expiry_seconds: jwt.refresh_token_expiry,
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
        }
    }
}
