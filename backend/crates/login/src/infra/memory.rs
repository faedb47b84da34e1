//! In-Memory Repository Implementation
//!
//! Same contract as the PostgreSQL repository, kept in process. Used by the
//! tests and by embedders that do not want a database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use tokio::sync::RwLock;

use crate::domain::entity::{auth_session::AuthSession, auth_token::AuthToken, user::User};
use crate::domain::repository::{AuthSessionRepository, AuthTokenRepository, UserRepository};
use crate::domain::value_object::{
    SessionId, UserId, login_field::LoginField, token_key::TokenKey,
};
use crate::error::{LoginError, LoginResult};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    /// Keyed by owner; at most one token per user
    tokens: HashMap<UserId, AuthToken>,
    sessions: HashMap<SessionId, AuthSession>,
}

/// In-memory login repository
#[derive(Default, Clone)]
pub struct MemoryLoginRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryLoginRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, live or not
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }
}

impl UserRepository for MemoryLoginRepository {
    async fn create_user(&self, user: &User) -> LoginResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(LoginError::Internal(format!(
                "username already exists: {}",
                user.username
            )));
        }
        tables.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_user(&self, user_id: &UserId) -> LoginResult<Option<User>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn find_user_by_field(
        &self,
        field: LoginField,
        value: &str,
    ) -> LoginResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|user| user.matches(field, value))
            .min_by_key(|user| user.date_joined)
            .cloned())
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> LoginResult<()> {
        if let Some(user) = self.tables.write().await.users.get_mut(user_id) {
            user.record_login(at);
        }
        Ok(())
    }

    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &HashedPassword,
    ) -> LoginResult<()> {
        if let Some(user) = self.tables.write().await.users.get_mut(user_id) {
            user.password_hash = password_hash.clone();
        }
        Ok(())
    }
}

impl AuthTokenRepository for MemoryLoginRepository {
    async fn get_or_create_token(&self, user_id: &UserId) -> LoginResult<(AuthToken, bool)> {
        let mut tables = self.tables.write().await;
        if let Some(token) = tables.tokens.get(user_id) {
            return Ok((token.clone(), false));
        }
        let token = AuthToken::new(*user_id);
        tables.tokens.insert(*user_id, token.clone());
        Ok((token, true))
    }

    async fn find_token_by_key(&self, key: &TokenKey) -> LoginResult<Option<AuthToken>> {
        let tables = self.tables.read().await;
        Ok(tables.tokens.values().find(|t| &t.key == key).cloned())
    }

    async fn delete_token_for_user(&self, user_id: &UserId) -> LoginResult<bool> {
        Ok(self.tables.write().await.tokens.remove(user_id).is_some())
    }
}

impl AuthSessionRepository for MemoryLoginRepository {
    async fn create_session(&self, session: &AuthSession) -> LoginResult<()> {
        self.tables
            .write()
            .await
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: &SessionId) -> LoginResult<Option<AuthSession>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .get(session_id)
            .filter(|s| !s.is_expired())
            .cloned())
    }

    async fn delete_session(&self, session_id: &SessionId) -> LoginResult<()> {
        self.tables.write().await.sessions.remove(session_id);
        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> LoginResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired());
        Ok((before - tables.sessions.len()) as u64)
    }
}
