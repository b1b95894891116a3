//! MySQL schema for users and token families
//!
//! Token values are never stored; the `*_token_hash` columns hold hex SHA-256
//! digests. `allowed_ips` holds the scope list as a JSON array.

pub const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id CHAR(36) NOT NULL PRIMARY KEY,
        username VARCHAR(64) NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        created_at DATETIME(6) NOT NULL,
        UNIQUE KEY uq_users_username (username)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

pub const CREATE_TOKENS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS tokens (
        id CHAR(36) NOT NULL PRIMARY KEY,
        user_id CHAR(36) NOT NULL,
        access_token_hash CHAR(64) NOT NULL,
        refresh_token_hash CHAR(64) NOT NULL,
        origin_ip TEXT NOT NULL,
        allowed_ips TEXT NOT NULL,
        access_expires_at DATETIME(6) NOT NULL,
        refresh_expires_at DATETIME(6) NOT NULL,
        is_revoked BOOLEAN NOT NULL DEFAULT FALSE,
        created_at DATETIME(6) NOT NULL,
        UNIQUE KEY uq_tokens_access (access_token_hash),
        UNIQUE KEY uq_tokens_refresh (refresh_token_hash),
        KEY idx_tokens_user (user_id),
        KEY idx_tokens_revoked (is_revoked),
        KEY idx_tokens_refresh_expiry (refresh_expires_at)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

/// Statements run in order to bootstrap the schema
pub const STATEMENTS: &[&str] = &[CREATE_USERS_TABLE, CREATE_TOKENS_TABLE];
