//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{auth_session::AuthSession, auth_token::AuthToken, user::User};
use crate::domain::repository::{AuthSessionRepository, AuthTokenRepository, UserRepository};
use crate::domain::value_object::{
    SessionId, UserId, login_field::LoginField, token_key::TokenKey,
};
use crate::error::{LoginError, LoginResult};

/// PostgreSQL-backed login repository
#[derive(Clone)]
pub struct PgLoginRepository {
    pool: PgPool,
}

impl PgLoginRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> LoginResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgLoginRepository {
    async fn create_user(&self, user: &User) -> LoginResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                email,
                password_hash,
                is_active,
                last_login,
                date_joined
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.password_hash.as_phc_string())
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.date_joined)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_user(&self, user_id: &UserId) -> LoginResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                email,
                password_hash,
                is_active,
                last_login,
                date_joined
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_user_by_field(
        &self,
        field: LoginField,
        value: &str,
    ) -> LoginResult<Option<User>> {
        let query = match field {
            LoginField::Username => {
                r#"
                SELECT
                    user_id,
                    username,
                    email,
                    password_hash,
                    is_active,
                    last_login,
                    date_joined
                FROM users
                WHERE username = $1
                "#
            }
            // Emails are not unique; the oldest account wins
            LoginField::Email => {
                r#"
                SELECT
                    user_id,
                    username,
                    email,
                    password_hash,
                    is_active,
                    last_login,
                    date_joined
                FROM users
                WHERE lower(email) = lower($1)
                ORDER BY date_joined
                LIMIT 1
                "#
            }
        };

        let row = sqlx::query_as::<_, UserRow>(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> LoginResult<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &HashedPassword,
    ) -> LoginResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(password_hash.as_phc_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Auth Token Repository Implementation
// ============================================================================

impl AuthTokenRepository for PgLoginRepository {
    async fn get_or_create_token(&self, user_id: &UserId) -> LoginResult<(AuthToken, bool)> {
        let token = AuthToken::new(*user_id);

        // A concurrent insert for the same user wins; fall back to reading it.
        let inserted = sqlx::query_as::<_, AuthTokenRow>(
            r#"
            INSERT INTO auth_tokens (key, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING key, user_id, created_at
            "#,
        )
        .bind(token.key.as_str())
        .bind(token.user_id.as_uuid())
        .bind(token.created_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok((row.into_token(), true));
        }

        let row = sqlx::query_as::<_, AuthTokenRow>(
            "SELECT key, user_id, created_at FROM auth_tokens WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| LoginError::Internal("Auth token vanished during get-or-create".into()))?;

        Ok((row.into_token(), false))
    }

    async fn find_token_by_key(&self, key: &TokenKey) -> LoginResult<Option<AuthToken>> {
        let row = sqlx::query_as::<_, AuthTokenRow>(
            "SELECT key, user_id, created_at FROM auth_tokens WHERE key = $1",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthTokenRow::into_token))
    }

    async fn delete_token_for_user(&self, user_id: &UserId) -> LoginResult<bool> {
        let deleted = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Auth Session Repository Implementation
// ============================================================================

impl AuthSessionRepository for PgLoginRepository {
    async fn create_session(&self, session: &AuthSession) -> LoginResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                expires_at_ms,
                client_ip,
                user_agent,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(session.expires_at_ms)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, session_id: &SessionId) -> LoginResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                expires_at_ms,
                client_ip,
                user_agent,
                created_at
            FROM auth_sessions
            WHERE session_id = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthSessionRow::into_session))
    }

    async fn delete_session(&self, session_id: &SessionId) -> LoginResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> LoginResult<u64> {
        self.cleanup_expired().await
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: Option<String>,
    password_hash: String,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    date_joined: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> LoginResult<User> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| LoginError::Internal(format!("Invalid password_hash: {}", e)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            username: self.username,
            email: self.email,
            password_hash,
            is_active: self.is_active,
            last_login: self.last_login,
            date_joined: self.date_joined,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthTokenRow {
    key: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl AuthTokenRow {
    fn into_token(self) -> AuthToken {
        AuthToken {
            key: TokenKey::from_db(self.key),
            user_id: UserId::from_uuid(self.user_id),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    expires_at_ms: i64,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: SessionId::from_uuid(self.session_id),
            user_id: UserId::from_uuid(self.user_id),
            expires_at_ms: self.expires_at_ms,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
        }
    }
}
