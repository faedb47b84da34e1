//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::entity::{auth_session::AuthSession, auth_token::AuthToken, user::User};
use crate::domain::value_object::{
    SessionId, UserId, login_field::LoginField, token_key::TokenKey,
};
use crate::error::LoginResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create_user(&self, user: &User) -> LoginResult<()>;

    /// Find user by ID
    async fn find_user(&self, user_id: &UserId) -> LoginResult<Option<User>>;

    /// Find user by a login field.
    ///
    /// Usernames match exactly, emails case-insensitively.
    async fn find_user_by_field(
        &self,
        field: LoginField,
        value: &str,
    ) -> LoginResult<Option<User>>;

    /// Stamp `last_login`
    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> LoginResult<()>;

    /// Replace the stored password hash
    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &HashedPassword,
    ) -> LoginResult<()>;
}

/// Auth token repository trait
#[trait_variant::make(AuthTokenRepository: Send)]
pub trait LocalAuthTokenRepository {
    /// Return the user's token, creating it if absent.
    ///
    /// The flag is `true` when a new token was created. Concurrent calls for
    /// the same user observe a single token.
    async fn get_or_create_token(&self, user_id: &UserId) -> LoginResult<(AuthToken, bool)>;

    /// Find token by key
    async fn find_token_by_key(&self, key: &TokenKey) -> LoginResult<Option<AuthToken>>;

    /// Delete the user's token; `false` if there was none
    async fn delete_token_for_user(&self, user_id: &UserId) -> LoginResult<bool>;
}

/// Auth session repository trait
#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    /// Create a new session
    async fn create_session(&self, session: &AuthSession) -> LoginResult<()>;

    /// Find a live (non-expired) session by ID
    async fn find_session(&self, session_id: &SessionId) -> LoginResult<Option<AuthSession>>;

    /// Delete a session
    async fn delete_session(&self, session_id: &SessionId) -> LoginResult<()>;

    /// Clean up expired sessions
    async fn cleanup_expired_sessions(&self) -> LoginResult<u64>;
}

/// Everything login needs from storage
pub trait LoginRepository:
    UserRepository + AuthTokenRepository + AuthSessionRepository + Send + Sync + 'static
{
}

impl<T> LoginRepository for T where
    T: UserRepository + AuthTokenRepository + AuthSessionRepository + Send + Sync + 'static
{
}
