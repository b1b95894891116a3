pub mod auth;
pub mod client_ip;

pub use auth::{AccessValidator, AuthContext, AuthMode, IpScopedAuth, OptionalAuth};
