//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing and verifying access and refresh tokens in separate domains
//! - Background sweeping of expired token families

mod cleanup;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use service::{CredentialSigner, IssuedToken};
