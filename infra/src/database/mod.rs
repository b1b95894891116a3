//! Database module - MySQL implementations using SQLx
//!
//! This module provides database access layer implementations including:
//! - Connection pool management
//! - Schema bootstrap
//! - Repository pattern implementations

pub mod connection;
pub mod mysql;
pub mod schema;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlTokenRepository, MySqlUserRepository};
