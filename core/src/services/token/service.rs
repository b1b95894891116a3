//! Credential signer: issues and verifies HS256 tokens in two signing domains

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::token::{ClaimFields, Claims, TokenKind};
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// Keys of one signing domain
struct DomainKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl DomainKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Produces and verifies signed, time-bounded tokens
///
/// Access and refresh tokens are signed with independent secrets. A token from one
/// domain fails signature verification in the other, and the `type` claim is checked
/// on top of that.
pub struct CredentialSigner {
    config: TokenServiceConfig,
    access: DomainKeys,
    refresh: DomainKeys,
    validation: Validation,
}

impl CredentialSigner {
    /// Creates a new signer
    ///
    /// # Returns
    ///
    /// * `Ok(CredentialSigner)` - Ready to issue tokens
    /// * `Err(DomainError::Configuration)` - A secret is empty or both domains share one
    pub fn new(config: TokenServiceConfig) -> Result<Self, DomainError> {
        if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
            return Err(DomainError::Configuration {
                message: "Signing secrets must not be empty".to_string(),
            });
        }
        if config.access_secret == config.refresh_secret {
            return Err(DomainError::Configuration {
                message: "Access and refresh signing secrets must differ".to_string(),
            });
        }

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Ok(Self {
            access: DomainKeys::from_secret(&config.access_secret),
            refresh: DomainKeys::from_secret(&config.refresh_secret),
            config,
            validation,
        })
    }

    /// Signer configuration
    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    fn keys(&self, kind: TokenKind) -> &DomainKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Signs a token of `kind` carrying `fields`, expiring `ttl_seconds` from now
    pub fn issue(
        &self,
        kind: TokenKind,
        fields: &ClaimFields,
        ttl_seconds: i64,
    ) -> Result<IssuedToken, DomainError> {
        let claims = Claims::with_issuer(
            kind,
            fields,
            ttl_seconds,
            &self.config.issuer,
            &self.config.audience,
        );
        let header = Header::new(self.config.algorithm);

        let token = encode(&header, &claims, &self.keys(kind).encoding)
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))?;

        Ok(IssuedToken { token, claims })
    }

    /// Signs a token of `kind` with the configured lifetime for that kind
    pub fn issue_default(
        &self,
        kind: TokenKind,
        fields: &ClaimFields,
    ) -> Result<IssuedToken, DomainError> {
        self.issue(kind, fields, self.config.ttl_for(kind))
    }

    /// Verifies a token against the signing domain of `kind`
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Decoded claims
    /// * `Err(TokenError::Expired)` - Signature valid but expiry has passed
    /// * `Err(TokenError::WrongKind)` - Signature valid but the token is of the other kind
    /// * `Err(TokenError::InvalidSignature)` - Anything else, malformed tokens included
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, DomainError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::Token(TokenError::Expired),
                _ => DomainError::Token(TokenError::InvalidSignature),
            })?;

        if data.claims.kind != kind {
            return Err(TokenError::WrongKind.into());
        }

        Ok(data.claims)
    }
}
