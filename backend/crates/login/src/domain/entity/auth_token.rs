//! Auth Token Entity
//!
//! One token per user, created on first request and deleted on revoke.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{UserId, token_key::TokenKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub key: TokenKey,
    /// Owner; unique across tokens
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Fresh token with a random key
    pub fn new(user_id: UserId) -> Self {
        Self {
            key: TokenKey::generate(),
            user_id,
            created_at: Utc::now(),
        }
    }
}
