//! Route handlers
//!
//! - `auth` - registration, login, token refresh, logout
//! - `protected` - routes behind the authentication gateway, plus the public
//!   and diagnostic routes

pub mod auth;
pub mod protected;

use std::sync::Arc;

use tg_core::repositories::{TokenRepository, UserRepository};
use tg_core::services::{AuthService, SessionService};

/// Application state that holds shared services
pub struct AppState<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub auth_service: Arc<AuthService<U, T>>,
    pub session_service: Arc<SessionService<T>>,
}

impl<U, T> AppState<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(auth_service: Arc<AuthService<U, T>>, session_service: Arc<SessionService<T>>) -> Self {
        Self {
            auth_service,
            session_service,
        }
    }
}
