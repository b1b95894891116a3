//! In-process stores
//!
//! Used when no `DATABASE_URL` is configured. State is lost on restart.

pub mod token_repository;
pub mod user_repository;

pub use token_repository::InMemoryTokenRepository;
pub use user_repository::InMemoryUserRepository;
