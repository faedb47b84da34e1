//! Logout Use Case
//!
//! Ends the request's session and optionally revokes the user's token.

use std::sync::Arc;

use crate::application::config::LoginConfig;
use crate::application::session::parse_session_token;
use crate::domain::repository::LoginRepository;
use crate::domain::value_object::UserId;
use crate::error::{LoginError, LoginResult};

/// Logout input
pub struct LogoutInput {
    /// Authenticated caller
    pub user_id: UserId,
    /// Session cookie present on the request
    pub current_session: Option<String>,
    pub revoke_token: bool,
}

/// Logout output
#[derive(Debug, Default)]
pub struct LogoutOutput {
    /// The session cookie should be cleared
    pub session_ended: bool,
    pub token_revoked: bool,
}

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: LoginRepository,
{
    repo: Arc<R>,
    config: Arc<LoginConfig>,
}

impl<R> LogoutUseCase<R>
where
    R: LoginRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<LoginConfig>) -> Self {
        Self { repo, config }
    }

    /// The session is ended before the token is looked at, so a failed
    /// revoke still leaves the caller logged out of the session.
    pub async fn execute(&self, input: LogoutInput) -> LoginResult<LogoutOutput> {
        let mut output = LogoutOutput::default();

        if self.config.should_authenticate_session() {
            if let Some(session_id) = input
                .current_session
                .as_deref()
                .and_then(|token| parse_session_token(&self.config.session_secret, token))
            {
                self.repo.delete_session(&session_id).await?;
                tracing::debug!(session_id = %session_id, "Session ended");
            }
            output.session_ended = true;
        }

        if self.config.should_retrieve_token() && input.revoke_token {
            if !self.repo.delete_token_for_user(&input.user_id).await? {
                return Err(LoginError::TokenNotFound);
            }
            output.token_revoked = true;
            tracing::info!(user_id = %input.user_id, "Auth token revoked");
        }

        tracing::info!(user_id = %input.user_id, "User logged out");
        Ok(output)
    }
}
