//! Token repository trait defining the interface for token family persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::{SessionSummary, TokenFamily};
use crate::errors::DomainError;

/// Repository trait for TokenFamily persistence operations
///
/// The session service is the only writer; the verification path only reads.
/// Lookups by token value only ever return non-revoked families.
///
/// # Security Considerations
/// - Durable backends should store digests of token values, not the bearer strings
/// - Expired families should be periodically swept
/// - A revocation must be visible to every subsequent read
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new token family
    ///
    /// # Returns
    /// * `Ok(TokenFamily)` - The saved family
    /// * `Err(DomainError::Token(TokenError::DuplicateToken))` - Access or refresh value already stored
    /// * `Err(DomainError)` - Storage failure
    async fn save_family(&self, family: TokenFamily) -> Result<TokenFamily, DomainError>;

    /// Find a non-revoked family by its refresh token
    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<TokenFamily>, DomainError>;

    /// Find a non-revoked family by its access token
    async fn find_by_access_token(&self, token: &str) -> Result<Option<TokenFamily>, DomainError>;

    /// Revoke every family owned by a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of families newly revoked
    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Revoke every family of `family.user_id` and insert `family`, as one atomic unit
    ///
    /// No reader may observe a state where both the old and the new family are live,
    /// or where neither the revocation nor the insert has happened partially.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of prior families revoked
    async fn replace_family(&self, family: TokenFamily) -> Result<usize, DomainError>;

    /// Revoke the single family holding this refresh token
    ///
    /// # Returns
    /// * `Ok(true)` - Family was revoked
    /// * `Ok(false)` - No live family holds the token
    async fn revoke_by_refresh_token(&self, token: &str) -> Result<bool, DomainError>;

    /// Whether the access token belongs to a non-revoked family whose access expiry has not passed
    async fn is_access_token_live(&self, token: &str) -> Result<bool, DomainError>;

    /// Non-revoked families of a user whose access token is still live, newest first
    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Vec<TokenFamily>, DomainError>;

    /// Delete families whose refresh expiry has passed
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of families deleted
    async fn delete_expired_tokens(&self) -> Result<usize, DomainError>;

    /// Active session summaries for a user, newest first
    async fn active_sessions(&self, user_id: Uuid) -> Result<Vec<SessionSummary>, DomainError> {
        let families = self.find_active_by_user_id(user_id).await?;
        Ok(families.iter().map(TokenFamily::summary).collect())
    }
}
