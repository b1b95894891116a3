//! Authentication response value object returned by a successful login.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::User;

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Authentication response containing the issued pair and user metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    /// The authenticated user
    pub user: UserSummary,

    /// Freshly issued token pair
    pub tokens: TokenPair,
}

impl AuthResponse {
    /// Creates an authentication response from a token pair and the user it belongs to
    pub fn from_token_pair(tokens: TokenPair, user: &User) -> Self {
        Self {
            user: UserSummary::from(user),
            tokens,
        }
    }
}
