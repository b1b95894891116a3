//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::TokenFamily;
use crate::errors::{DomainError, TokenError};

use super::r#trait::TokenRepository;

/// Mock token repository for testing
pub struct MockTokenRepository {
    families: Arc<RwLock<Vec<TokenFamily>>>,
    fail_reads: AtomicBool,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            families: Arc::new(RwLock::new(Vec::new())),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Make every subsequent read and sweep fail with an internal error
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Snapshot of every stored family, revoked ones included
    pub async fn all(&self) -> Vec<TokenFamily> {
        self.families.read().await.clone()
    }

    /// Number of non-revoked families owned by a user
    pub async fn live_count(&self, user_id: Uuid) -> usize {
        self.families
            .read()
            .await
            .iter()
            .filter(|f| f.user_id == user_id && !f.revoked)
            .count()
    }

    fn check_reads(&self) -> Result<(), DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::Internal {
                message: "mock storage unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn insert(families: &mut Vec<TokenFamily>, family: TokenFamily) -> Result<(), DomainError> {
        if families.iter().any(|f| {
            f.access_token == family.access_token || f.refresh_token == family.refresh_token
        }) {
            return Err(TokenError::DuplicateToken.into());
        }
        families.push(family);
        Ok(())
    }

    fn revoke_user(families: &mut [TokenFamily], user_id: Uuid) -> usize {
        let mut count = 0;
        for family in families.iter_mut().filter(|f| f.user_id == user_id && !f.revoked) {
            family.revoke();
            count += 1;
        }
        count
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save_family(&self, family: TokenFamily) -> Result<TokenFamily, DomainError> {
        let mut families = self.families.write().await;
        Self::insert(&mut families, family.clone())?;
        Ok(family)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<TokenFamily>, DomainError> {
        self.check_reads()?;
        let families = self.families.read().await;
        Ok(families
            .iter()
            .find(|f| f.refresh_token == token && !f.revoked)
            .cloned())
    }

    async fn find_by_access_token(&self, token: &str) -> Result<Option<TokenFamily>, DomainError> {
        self.check_reads()?;
        let families = self.families.read().await;
        Ok(families
            .iter()
            .find(|f| f.access_token == token && !f.revoked)
            .cloned())
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut families = self.families.write().await;
        Ok(Self::revoke_user(&mut families, user_id))
    }

    async fn replace_family(&self, family: TokenFamily) -> Result<usize, DomainError> {
        let mut families = self.families.write().await;
        let revoked = Self::revoke_user(&mut families, family.user_id);
        Self::insert(&mut families, family)?;
        Ok(revoked)
    }

    async fn revoke_by_refresh_token(&self, token: &str) -> Result<bool, DomainError> {
        let mut families = self.families.write().await;
        match families
            .iter_mut()
            .find(|f| f.refresh_token == token && !f.revoked)
        {
            Some(family) => {
                family.revoke();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn is_access_token_live(&self, token: &str) -> Result<bool, DomainError> {
        self.check_reads()?;
        let families = self.families.read().await;
        Ok(families
            .iter()
            .any(|f| f.access_token == token && f.is_access_live()))
    }

    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Vec<TokenFamily>, DomainError> {
        self.check_reads()?;
        let families = self.families.read().await;
        let mut active: Vec<TokenFamily> = families
            .iter()
            .filter(|f| f.user_id == user_id && f.is_access_live())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        self.check_reads()?;
        let now = Utc::now();
        let mut families = self.families.write().await;
        let before = families.len();
        families.retain(|f| !f.is_refresh_expired_at(now));
        Ok(before - families.len())
    }
}
