//! Main authentication service implementation

use std::sync::Arc;

use tg_shared::validation::{validate_credentials, validators};
use tracing::{info, warn};

use crate::domain::entities::user::User;
use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, DomainError, DomainResult, ValidationError};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::session::SessionService;

use super::config::AuthServiceConfig;

/// Authentication service for registration and password login
pub struct AuthService<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    /// User repository for account records
    user_repository: Arc<U>,
    /// Session authority issuing token pairs
    sessions: Arc<SessionService<T>>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U, T> AuthService<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for user data persistence
    /// * `sessions` - Session authority used to issue token pairs
    /// * `config` - Service configuration
    pub fn new(
        user_repository: Arc<U>,
        sessions: Arc<SessionService<T>>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            sessions,
            config,
        }
    }

    /// The user repository
    pub fn users(&self) -> &Arc<U> {
        &self.user_repository
    }

    /// Register a new account
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The created user
    /// * `Err(ValidationError)` - Username or password fails validation
    /// * `Err(AuthError::UserAlreadyExists)` - Username taken
    pub async fn register(&self, username: &str, password: &str) -> DomainResult<User> {
        if !self.config.allow_registration {
            return Err(DomainError::Validation {
                message: "Registration is disabled".to_string(),
            });
        }

        validate_credentials(username, password).map_err(ValidationError::from)?;

        if self.user_repository.exists_by_username(username).await? {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let password_hash = hash_password(password, self.config.bcrypt_cost).await?;
        let user = self
            .user_repository
            .create(User::new(username.to_string(), password_hash))
            .await?;

        info!(user_id = %user.id, "Registered new user");
        Ok(user)
    }

    /// Authenticate with username and password and issue a token pair
    ///
    /// # Arguments
    ///
    /// * `client_ip` - Address the request came from; becomes the family's origin
    /// * `allowed_ips` - Optional scope patterns; defaults to the origin address
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - The issued pair and the user it belongs to
    /// * `Err(ValidationError)` - Missing fields or a malformed scope pattern
    /// * `Err(AuthError::InvalidCredentials)` - Unknown user or wrong password
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client_ip: &str,
        allowed_ips: Option<Vec<String>>,
    ) -> DomainResult<AuthResponse> {
        if !validators::not_empty(username) {
            return Err(ValidationError::RequiredField {
                field: "username".to_string(),
            }
            .into());
        }
        if password.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "password".to_string(),
            }
            .into());
        }

        let user = match self.user_repository.find_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(client_ip = %client_ip, "Login attempt for unknown user");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password(password, &user.password_hash).await? {
            warn!(user_id = %user.id, client_ip = %client_ip, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self
            .sessions
            .issue_pair(user.id, &user.username, client_ip, allowed_ips)
            .await?;

        info!(user_id = %user.id, client_ip = %tokens.origin_ip, "User logged in");
        Ok(AuthResponse::from_token_pair(tokens, &user))
    }
}

/// Hash a password off the async executor
async fn hash_password(password: &str, cost: u32) -> DomainResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Password hashing task failed: {}", e),
        })?
        .map_err(|e| DomainError::Internal {
            message: format!("Password hashing failed: {}", e),
        })
}

/// Verify a password against a stored bcrypt hash off the async executor
///
/// A malformed stored hash counts as a mismatch.
async fn verify_password(password: &str, password_hash: &str) -> DomainResult<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash).unwrap_or(false))
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Password verification task failed: {}", e),
        })
}
