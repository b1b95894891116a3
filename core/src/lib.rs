//! # Tokengate Core
//!
//! Core token lifecycle logic and domain layer for the tokengate server.
//! This crate contains domain entities, the credential signer, the session
//! authority, repository interfaces, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
