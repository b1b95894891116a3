//! Shared utilities and common types for the tokengate server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - IP address normalization and scope matching
//! - Credential input validation

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
    ServerConfig, SessionConfig,
};
pub use utils::{ip, validation};
