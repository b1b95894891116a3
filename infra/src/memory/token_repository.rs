//! In-memory implementation of the TokenRepository trait.
//!
//! Every family lives in one map guarded by a single `RwLock`, with indexes from
//! access and refresh token values to the family ID. Writes take the write lock
//! for their whole duration, so `replace_family` is atomic with respect to every
//! reader.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use tg_core::domain::entities::token::TokenFamily;
use tg_core::errors::{DomainError, TokenError};
use tg_core::repositories::TokenRepository;

#[derive(Default)]
struct TokenState {
    families: HashMap<Uuid, TokenFamily>,
    by_access: HashMap<String, Uuid>,
    by_refresh: HashMap<String, Uuid>,
}

impl TokenState {
    fn insert(&mut self, family: TokenFamily) -> Result<(), DomainError> {
        if self.by_access.contains_key(&family.access_token)
            || self.by_refresh.contains_key(&family.refresh_token)
        {
            return Err(TokenError::DuplicateToken.into());
        }

        self.by_access.insert(family.access_token.clone(), family.id);
        self.by_refresh.insert(family.refresh_token.clone(), family.id);
        self.families.insert(family.id, family);
        Ok(())
    }

    fn live_by(&self, index: &HashMap<String, Uuid>, token: &str) -> Option<&TokenFamily> {
        index
            .get(token)
            .and_then(|id| self.families.get(id))
            .filter(|family| !family.revoked)
    }

    fn revoke_user(&mut self, user_id: Uuid) -> usize {
        let mut revoked = 0;
        for family in self
            .families
            .values_mut()
            .filter(|f| f.user_id == user_id && !f.revoked)
        {
            family.revoke();
            revoked += 1;
        }
        revoked
    }
}

/// In-memory token store
#[derive(Default)]
pub struct InMemoryTokenRepository {
    state: RwLock<TokenState>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored families, revoked ones included
    pub async fn len(&self) -> usize {
        self.state.read().await.families.len()
    }

    /// Whether the store holds no families at all
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save_family(&self, family: TokenFamily) -> Result<TokenFamily, DomainError> {
        let mut state = self.state.write().await;
        state.insert(family.clone())?;
        Ok(family)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<TokenFamily>, DomainError> {
        let state = self.state.read().await;
        Ok(state.live_by(&state.by_refresh, token).cloned())
    }

    async fn find_by_access_token(&self, token: &str) -> Result<Option<TokenFamily>, DomainError> {
        let state = self.state.read().await;
        Ok(state.live_by(&state.by_access, token).cloned())
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut state = self.state.write().await;
        Ok(state.revoke_user(user_id))
    }

    async fn replace_family(&self, family: TokenFamily) -> Result<usize, DomainError> {
        let mut state = self.state.write().await;

        // Check before revoking so a rejected insert leaves the store untouched
        if state.by_access.contains_key(&family.access_token)
            || state.by_refresh.contains_key(&family.refresh_token)
        {
            return Err(TokenError::DuplicateToken.into());
        }

        let revoked = state.revoke_user(family.user_id);
        state.insert(family)?;
        Ok(revoked)
    }

    async fn revoke_by_refresh_token(&self, token: &str) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let id = match state.by_refresh.get(token) {
            Some(id) => *id,
            None => return Ok(false),
        };

        match state.families.get_mut(&id) {
            Some(family) if !family.revoked => {
                family.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn is_access_token_live(&self, token: &str) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        let now = Utc::now();
        Ok(state
            .live_by(&state.by_access, token)
            .map_or(false, |family| family.is_access_live_at(now)))
    }

    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Vec<TokenFamily>, DomainError> {
        let state = self.state.read().await;
        let now = Utc::now();
        let mut active: Vec<TokenFamily> = state
            .families
            .values()
            .filter(|f| f.user_id == user_id && f.is_access_live_at(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let expired: Vec<Uuid> = state
            .families
            .values()
            .filter(|f| f.is_refresh_expired_at(now))
            .map(|f| f.id)
            .collect();

        for id in &expired {
            if let Some(family) = state.families.remove(id) {
                state.by_access.remove(&family.access_token);
                state.by_refresh.remove(&family.refresh_token);
            }
        }

        debug!(deleted = expired.len(), "Deleted expired in-memory token families");
        Ok(expired.len())
    }
}
