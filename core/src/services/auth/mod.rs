//! Authentication service module
//!
//! Registration and password login. A successful login hands off to the
//! session authority, which issues the IP-scoped token pair.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
