//! Domain entities representing core business objects.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{
    ClaimFields, Claims, SessionSummary, TokenFamily, TokenKind, TokenPair,
    ACCESS_TOKEN_EXPIRY_SECONDS, JWT_AUDIENCE, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_SECONDS,
    TOKEN_TYPE_BEARER,
};
pub use user::User;
