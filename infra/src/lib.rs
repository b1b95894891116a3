//! # Infrastructure Layer
//!
//! Concrete implementations of the repository traits defined in `tg_core`.
//!
//! ## Architecture
//!
//! - **Memory**: process-local token and user stores, used when no database is configured
//! - **Database**: MySQL implementations using SQLx
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use tg_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// In-process store implementations
pub mod memory;

/// Token digest helpers shared by durable stores
pub mod digest;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::Internal {
            message: error.to_string(),
        }
    }
}
