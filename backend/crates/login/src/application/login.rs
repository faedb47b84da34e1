//! Login Use Case
//!
//! Resolves the caller through the configured login fields, then starts a
//! session and/or hands out the user's token as configured.

use std::sync::Arc;

use chrono::Utc;
use platform::client::ClientInfo;
use platform::password::ClearTextPassword;

use crate::application::config::LoginConfig;
use crate::application::session::{parse_session_token, sign_session_token};
use crate::domain::backend::{AuthBackend, Credentials};
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::LoginRepository;
use crate::domain::value_object::{UserId, token_key::TokenKey};
use crate::error::{LoginError, LoginResult};

/// Login input
pub struct LoginInput {
    /// Value matched against each login field
    pub login: String,
    pub password: ClearTextPassword,
    /// Session cookie already present on the request, rotated on success
    pub current_session: Option<String>,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub user_id: UserId,
    /// Signed session token for the cookie, when sessions are in use
    pub session_token: Option<String>,
    /// The user's token, when tokens are handed out
    pub token: Option<TokenKey>,
}

/// Login use case
pub struct LoginUseCase<R, B>
where
    R: LoginRepository,
    B: AuthBackend,
{
    repo: Arc<R>,
    backend: Arc<B>,
    config: Arc<LoginConfig>,
}

impl<R, B> LoginUseCase<R, B>
where
    R: LoginRepository,
    B: AuthBackend + Sync,
{
    pub fn new(repo: Arc<R>, backend: Arc<B>, config: Arc<LoginConfig>) -> Self {
        Self {
            repo,
            backend,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput, client: &ClientInfo) -> LoginResult<LoginOutput> {
        let user = self
            .resolve_user(&input.login, &input.password)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        let session_token = if self.config.should_authenticate_session() {
            Some(
                self.start_session(&user, input.current_session.as_deref(), client)
                    .await?,
            )
        } else {
            None
        };

        let token = if self.config.should_retrieve_token() {
            let (token, created) = self.repo.get_or_create_token(&user.user_id).await?;
            if created {
                tracing::info!(user_id = %user.user_id, "Auth token issued");
            }
            Some(token.key)
        } else {
            None
        };

        tracing::info!(
            user_id = %user.user_id,
            session = session_token.is_some(),
            token = token.is_some(),
            "User logged in"
        );

        Ok(LoginOutput {
            user_id: user.user_id,
            session_token,
            token,
        })
    }

    /// Try each login field in order; the first accepted one wins
    async fn resolve_user(
        &self,
        login: &str,
        password: &ClearTextPassword,
    ) -> LoginResult<Option<User>> {
        for &field in self.config.login_fields() {
            let credentials = Credentials {
                field,
                login,
                password,
            };
            if let Some(user) = self.backend.authenticate(credentials).await? {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    /// Replace any session the request carried with a fresh one
    async fn start_session(
        &self,
        user: &User,
        current_session: Option<&str>,
        client: &ClientInfo,
    ) -> LoginResult<String> {
        if let Some(old_id) =
            current_session.and_then(|token| parse_session_token(&self.config.session_secret, token))
        {
            self.repo.delete_session(&old_id).await?;
        }

        let session = self
            .config
            .session_ttl_delta()
            .and_then(|ttl| AuthSession::new(user.user_id, ttl, client))
            .ok_or_else(|| LoginError::Internal("Session lifetime out of range".into()))?;
        self.repo.create_session(&session).await?;
        self.repo.record_login(&user.user_id, Utc::now()).await?;

        tracing::debug!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "Session started"
        );

        Ok(sign_session_token(
            &self.config.session_secret,
            &session.session_id,
        ))
    }
}
