//! Session authority: issues, rotates, validates and revokes token families

use std::sync::Arc;

use tg_shared::ip;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::token::{
    ClaimFields, Claims, SessionSummary, TokenFamily, TokenKind, TokenPair,
};
use crate::errors::{DomainError, TokenError, ValidationError};
use crate::repositories::TokenRepository;
use crate::services::token::CredentialSigner;

use super::locks::UserLocks;

/// Issues token pairs bound to client addresses and keeps at most one live family per user
///
/// The service is the only writer of the token store. Every issuance for a user runs
/// under that user's lock and commits through the store's atomic `replace_family`.
pub struct SessionService<T: TokenRepository> {
    repository: Arc<T>,
    signer: CredentialSigner,
    locks: UserLocks,
}

impl<T: TokenRepository> SessionService<T> {
    /// Creates a new session service
    pub fn new(repository: Arc<T>, signer: CredentialSigner) -> Self {
        Self {
            repository,
            signer,
            locks: UserLocks::new(),
        }
    }

    /// The underlying token store
    pub fn repository(&self) -> &Arc<T> {
        &self.repository
    }

    /// The credential signer
    pub fn signer(&self) -> &CredentialSigner {
        &self.signer
    }

    /// Issue a new token pair for a user, revoking every family they held before
    ///
    /// `scopes` defaults to the normalized origin address when absent or empty.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The new pair
    /// * `Err(ValidationError::InvalidScopePattern)` - A supplied scope is malformed
    /// * `Err(DomainError)` - Signing or storage failure
    pub async fn issue_pair(
        &self,
        user_id: Uuid,
        username: &str,
        origin_ip: &str,
        scopes: Option<Vec<String>>,
    ) -> Result<TokenPair, DomainError> {
        let origin = ip::normalize(origin_ip);
        let scopes = resolve_scopes(&origin, scopes)?;

        let _guard = self.locks.lock(user_id).await;
        self.issue_locked(user_id, username, origin, scopes).await
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The new family keeps the scopes of the old one and records `current_ip` as
    /// its origin. A refresh token can be used at most once.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The new pair
    /// * `Err(TokenError::InvalidSignature | Expired | WrongKind)` - Token fails verification
    /// * `Err(TokenError::NotFound)` - Token already used, revoked, or never stored
    /// * `Err(TokenError::IpMismatch)` - `current_ip` is outside the family's scopes
    pub async fn refresh_pair(
        &self,
        refresh_token: &str,
        current_ip: &str,
    ) -> Result<TokenPair, DomainError> {
        let claims = self.signer.verify(refresh_token, TokenKind::Refresh)?;
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidSignature))?;

        // Lookup and reissue under one lock so a token cannot be redeemed twice
        let _guard = self.locks.lock(user_id).await;

        let family = self
            .repository
            .find_by_refresh_token(refresh_token)
            .await?
            .ok_or(DomainError::Token(TokenError::NotFound))?;

        let current = ip::normalize(current_ip);
        if !ip::matches(&current, &family.allowed_scopes) {
            warn!(
                user_id = %user_id,
                client_ip = %current,
                "Refresh attempted from outside token scope"
            );
            return Err(TokenError::IpMismatch.into());
        }

        self.issue_locked(user_id, &claims.username, current, family.allowed_scopes)
            .await
    }

    /// Validate an access token presented from `current_ip`
    ///
    /// Checks run cheapest first: store liveness, then signature and kind, then scope.
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The token is live, genuine, and used from within its scope
    /// * `Err(TokenError::Revoked)` - The store does not hold it as live
    /// * `Err(TokenError::InvalidSignature | Expired | WrongKind)` - Verification failed
    /// * `Err(TokenError::IpMismatch)` - `current_ip` is outside the token's scopes
    pub async fn validate(
        &self,
        access_token: &str,
        current_ip: &str,
    ) -> Result<Claims, DomainError> {
        if !self.repository.is_access_token_live(access_token).await? {
            return Err(TokenError::Revoked.into());
        }

        let claims = self.signer.verify(access_token, TokenKind::Access)?;

        let current = ip::normalize(current_ip);
        if !ip::matches(&current, &claims.allowed_ips) {
            debug!(
                user_id = %claims.sub,
                client_ip = %current,
                "Access token presented from outside its scope"
            );
            return Err(TokenError::IpMismatch.into());
        }

        Ok(claims)
    }

    /// Revoke every family held by a user
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let _guard = self.locks.lock(user_id).await;
        let revoked = self.repository.revoke_all_user_tokens(user_id).await?;
        info!(user_id = %user_id, revoked, "Revoked all token families");
        Ok(revoked)
    }

    /// Revoke the single family holding a refresh token
    pub async fn revoke_session(&self, refresh_token: &str) -> Result<bool, DomainError> {
        self.repository.revoke_by_refresh_token(refresh_token).await
    }

    /// Live sessions of a user, newest first
    pub async fn active_sessions(&self, user_id: Uuid) -> Result<Vec<SessionSummary>, DomainError> {
        self.repository.active_sessions(user_id).await
    }

    async fn issue_locked(
        &self,
        user_id: Uuid,
        username: &str,
        origin: String,
        scopes: Vec<String>,
    ) -> Result<TokenPair, DomainError> {
        let fields = ClaimFields {
            user_id,
            username: username.to_string(),
            origin_ip: origin,
            allowed_scopes: scopes,
        };

        let access = self.signer.issue_default(TokenKind::Access, &fields)?;
        let refresh = self.signer.issue_default(TokenKind::Refresh, &fields)?;

        let family = TokenFamily::new(
            user_id,
            access.token,
            refresh.token,
            fields.origin_ip,
            fields.allowed_scopes,
            access.claims.expires_at(),
            refresh.claims.expires_at(),
        );
        let pair = TokenPair::from_family(&family, self.signer.config().access_token_expiry_seconds);

        let revoked = self.repository.replace_family(family).await?;
        info!(
            user_id = %user_id,
            client_ip = %pair.origin_ip,
            revoked,
            "Issued token pair"
        );

        Ok(pair)
    }
}

/// Scopes a new family is bound to
fn resolve_scopes(origin: &str, scopes: Option<Vec<String>>) -> Result<Vec<String>, DomainError> {
    let scopes: Vec<String> = scopes
        .unwrap_or_default()
        .into_iter()
        .map(|scope| scope.trim().to_string())
        .filter(|scope| !scope.is_empty())
        .collect();

    if scopes.is_empty() {
        return Ok(vec![origin.to_string()]);
    }

    if let Some(invalid) = scopes.iter().find(|scope| !ip::validate_pattern(scope)) {
        return Err(ValidationError::InvalidScopePattern {
            pattern: invalid.clone(),
        }
        .into());
    }

    // Literal addresses are stored in the form client addresses are compared in
    Ok(scopes
        .into_iter()
        .map(|scope| {
            if ip::is_ip_address(&scope) {
                ip::normalize(&scope)
            } else {
                scope
            }
        })
        .collect())
}
