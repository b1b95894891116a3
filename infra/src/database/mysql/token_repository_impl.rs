//! MySQL implementation of the TokenRepository trait.
//!
//! Token families are stored with SHA-256 digests of their access and refresh
//! tokens; presented tokens are hashed before every lookup. Families read back
//! from the database therefore carry digests in their token fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool, Row};
use uuid::Uuid;

use tg_core::domain::entities::token::TokenFamily;
use tg_core::errors::{DomainError, TokenError};
use tg_core::repositories::TokenRepository;

use crate::digest::hash_token;
use crate::InfrastructureError;

const FAMILY_COLUMNS: &str = r#"
    id, user_id, access_token_hash, refresh_token_hash, origin_ip, allowed_ips,
    access_expires_at, refresh_expires_at, is_revoked, created_at
"#;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to TokenFamily entity
    fn row_to_family(row: &MySqlRow) -> Result<TokenFamily, InfrastructureError> {
        let id: String = row.try_get("id")?;
        let user_id: String = row.try_get("user_id")?;
        let allowed_ips: String = row.try_get("allowed_ips")?;

        Ok(TokenFamily {
            id: Uuid::parse_str(&id)
                .map_err(|e| InfrastructureError::Corrupt(format!("Invalid token UUID: {}", e)))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| InfrastructureError::Corrupt(format!("Invalid user UUID: {}", e)))?,
            access_token: row.try_get("access_token_hash")?,
            refresh_token: row.try_get("refresh_token_hash")?,
            origin_ip: row.try_get("origin_ip")?,
            allowed_scopes: serde_json::from_str(&allowed_ips).map_err(|e| {
                InfrastructureError::Corrupt(format!("Invalid allowed_ips: {}", e))
            })?,
            access_expires_at: row.try_get::<DateTime<Utc>, _>("access_expires_at")?,
            refresh_expires_at: row.try_get::<DateTime<Utc>, _>("refresh_expires_at")?,
            revoked: row.try_get("is_revoked")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    /// Build the INSERT for a family, hashing its token values
    fn insert_query(
        family: &TokenFamily,
    ) -> Result<Query<'static, MySql, MySqlArguments>, InfrastructureError> {
        let allowed_ips = serde_json::to_string(&family.allowed_scopes)
            .map_err(|e| InfrastructureError::Corrupt(format!("Unencodable allowed_ips: {}", e)))?;

        Ok(sqlx::query(
            r#"
            INSERT INTO tokens (
                id, user_id, access_token_hash, refresh_token_hash, origin_ip, allowed_ips,
                access_expires_at, refresh_expires_at, is_revoked, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(family.id.to_string())
        .bind(family.user_id.to_string())
        .bind(hash_token(&family.access_token))
        .bind(hash_token(&family.refresh_token))
        .bind(family.origin_ip.clone())
        .bind(allowed_ips)
        .bind(family.access_expires_at)
        .bind(family.refresh_expires_at)
        .bind(family.revoked)
        .bind(family.created_at))
    }

    async fn find_live_by(
        &self,
        column: &str,
        token: &str,
    ) -> Result<Option<TokenFamily>, DomainError> {
        let query = format!(
            "SELECT {} FROM tokens WHERE {} = ? AND is_revoked = FALSE LIMIT 1",
            FAMILY_COLUMNS, column
        );

        let row = sqlx::query(&query)
            .bind(hash_token(token))
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_family(&row)?)),
            None => Ok(None),
        }
    }
}

/// Map an insert failure, turning unique-key violations into `DuplicateToken`
fn insert_error(error: sqlx::Error) -> DomainError {
    let duplicate = error
        .as_database_error()
        .map_or(false, |db| db.is_unique_violation());

    if duplicate {
        TokenError::DuplicateToken.into()
    } else {
        InfrastructureError::Database(error).into()
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_family(&self, family: TokenFamily) -> Result<TokenFamily, DomainError> {
        Self::insert_query(&family)?
            .execute(&self.pool)
            .await
            .map_err(insert_error)?;

        Ok(family)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<TokenFamily>, DomainError> {
        self.find_live_by("refresh_token_hash", token).await
    }

    async fn find_by_access_token(&self, token: &str) -> Result<Option<TokenFamily>, DomainError> {
        self.find_live_by("access_token_hash", token).await
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE tokens SET is_revoked = TRUE WHERE user_id = ? AND is_revoked = FALSE",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() as usize)
    }

    async fn replace_family(&self, family: TokenFamily) -> Result<usize, DomainError> {
        let user_id = family.user_id.to_string();
        let mut tx = self.pool.begin().await.map_err(InfrastructureError::from)?;

        // Row lock on the user serializes concurrent issuance across processes
        sqlx::query("SELECT id FROM users WHERE id = ? FOR UPDATE")
            .bind(&user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(InfrastructureError::from)?;

        let revoked = sqlx::query(
            "UPDATE tokens SET is_revoked = TRUE WHERE user_id = ? AND is_revoked = FALSE",
        )
        .bind(&user_id)
        .execute(&mut *tx)
        .await
        .map_err(InfrastructureError::from)?
        .rows_affected();

        // Dropping the transaction on error rolls it back
        Self::insert_query(&family)?
            .execute(&mut *tx)
            .await
            .map_err(insert_error)?;

        tx.commit().await.map_err(InfrastructureError::from)?;

        Ok(revoked as usize)
    }

    async fn revoke_by_refresh_token(&self, token: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE tokens SET is_revoked = TRUE WHERE refresh_token_hash = ? AND is_revoked = FALSE",
        )
        .bind(hash_token(token))
        .execute(&self.pool)
        .await
        .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_access_token_live(&self, token: &str) -> Result<bool, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tokens
            WHERE access_token_hash = ? AND is_revoked = FALSE AND access_expires_at > ?
            "#,
        )
        .bind(hash_token(token))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(InfrastructureError::from)?;

        Ok(count > 0)
    }

    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Vec<TokenFamily>, DomainError> {
        let query = format!(
            r#"
            SELECT {} FROM tokens
            WHERE user_id = ? AND is_revoked = FALSE AND access_expires_at > ?
            ORDER BY created_at DESC
            "#,
            FAMILY_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        let families = rows
            .iter()
            .map(Self::row_to_family)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(families)
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM tokens WHERE refresh_expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() as usize)
    }
}
