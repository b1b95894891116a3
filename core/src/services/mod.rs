//! Business services containing domain logic and use cases.

pub mod auth;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig};
pub use session::{SessionService, UserLocks};
pub use token::{
    CleanupResult, CredentialSigner, IssuedToken, TokenCleanupConfig, TokenCleanupService,
    TokenServiceConfig,
};
