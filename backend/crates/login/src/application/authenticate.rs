//! Request Authentication Use Case
//!
//! Identifies the caller of a request by trying the registered
//! authentication classes in order.

use std::sync::Arc;

use platform::crypto;
use platform::password::ClearTextPassword;

use crate::application::config::{AuthenticationClass, LoginConfig};
use crate::application::session::parse_session_token;
use crate::domain::backend::{AuthBackend, Credentials};
use crate::domain::entity::user::User;
use crate::domain::repository::LoginRepository;
use crate::domain::value_object::{SessionId, token_key::TokenKey};
use crate::error::{LoginError, LoginResult};

/// Credential material lifted off a request
#[derive(Debug, Default, Clone)]
pub struct RequestCredentials {
    /// Session cookie value
    pub session_cookie: Option<String>,
    /// `Authorization` header value
    pub authorization: Option<String>,
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    /// Class that identified the caller
    pub via: AuthenticationClass,
    /// Session behind the caller, for session authentication
    pub session_id: Option<SessionId>,
}

/// Request authentication use case
pub struct AuthenticateUseCase<R, B>
where
    R: LoginRepository,
    B: AuthBackend,
{
    repo: Arc<R>,
    backend: Arc<B>,
    config: Arc<LoginConfig>,
}

impl<R, B> AuthenticateUseCase<R, B>
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

    /// First class that identifies the caller wins.
    ///
    /// `Ok(None)` means no class applied. A class that finds malformed or
    /// rejected credentials fails the whole request.
    pub async fn execute(&self, request: &RequestCredentials) -> LoginResult<Option<Principal>> {
        for &class in &self.config.default_authentication_classes {
            let principal = match class {
                AuthenticationClass::Session => self.session(request).await?,
                AuthenticationClass::Token => self.token(request).await?,
                AuthenticationClass::Basic => self.basic(request).await?,
            };
            if principal.is_some() {
                return Ok(principal);
            }
        }
        Ok(None)
    }

    /// Same as [`execute`](Self::execute) but a missing caller is an error
    pub async fn require(&self, request: &RequestCredentials) -> LoginResult<Principal> {
        self.execute(request)
            .await?
            .ok_or(LoginError::NotAuthenticated {
                challenge: self.config.challenge(),
            })
    }

    fn failed(&self, reason: &'static str) -> LoginError {
        LoginError::AuthenticationFailed {
            reason,
            challenge: self.config.challenge(),
        }
    }

    /// Any problem with the cookie simply means "not via session"
    async fn session(&self, request: &RequestCredentials) -> LoginResult<Option<Principal>> {
        let Some(session_id) = request
            .session_cookie
            .as_deref()
            .and_then(|token| parse_session_token(&self.config.session_secret, token))
        else {
            return Ok(None);
        };

        let Some(session) = self.repo.find_session(&session_id).await? else {
            return Ok(None);
        };

        match self.repo.find_user(&session.user_id).await? {
            Some(user) if user.is_active => Ok(Some(Principal {
                user,
                via: AuthenticationClass::Session,
                session_id: Some(session_id),
            })),
            _ => Ok(None),
        }
    }

    async fn token(&self, request: &RequestCredentials) -> LoginResult<Option<Principal>> {
        let Some(parts) = scheme_parts(request.authorization.as_deref(), "token") else {
            return Ok(None);
        };

        let key = match parts.as_slice() {
            [] => return Err(self.failed("Invalid token header. No credentials provided.")),
            [key] => *key,
            _ => {
                return Err(self.failed(
                    "Invalid token header. Token string should not contain spaces.",
                ));
            }
        };

        let token = match TokenKey::parse(key) {
            Some(key) => self.repo.find_token_by_key(&key).await?,
            None => None,
        };
        let Some(token) = token else {
            return Err(self.failed("Invalid token."));
        };

        match self.repo.find_user(&token.user_id).await? {
            Some(user) if user.is_active => Ok(Some(Principal {
                user,
                via: AuthenticationClass::Token,
                session_id: None,
            })),
            _ => Err(self.failed("User inactive or deleted.")),
        }
    }

    async fn basic(&self, request: &RequestCredentials) -> LoginResult<Option<Principal>> {
        let Some(parts) = scheme_parts(request.authorization.as_deref(), "basic") else {
            return Ok(None);
        };

        let encoded = match parts.as_slice() {
            [] => return Err(self.failed("Invalid basic header. No credentials provided.")),
            [encoded] => *encoded,
            _ => {
                return Err(self.failed(
                    "Invalid basic header. Credentials string should not contain spaces.",
                ));
            }
        };

        let decoded = crypto::from_base64(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| {
                self.failed("Invalid basic header. Credentials not correctly base64 encoded.")
            })?;
        let (login, password) = decoded.split_once(':').unwrap_or((decoded.as_str(), ""));
        let password = ClearTextPassword::new(password);

        let credentials = Credentials {
            field: self.config.user_model.username_field,
            login,
            password: &password,
        };
        match self.backend.authenticate(credentials).await? {
            Some(user) => Ok(Some(Principal {
                user,
                via: AuthenticationClass::Basic,
                session_id: None,
            })),
            None => Err(self.failed("Invalid username/password.")),
        }
    }
}

/// Whitespace-separated words after `scheme`, or `None` when the header is
/// absent or uses another scheme
fn scheme_parts<'a>(authorization: Option<&'a str>, scheme: &str) -> Option<Vec<&'a str>> {
    let mut words = authorization?.split_whitespace();
    let first = words.next()?;
    if !first.eq_ignore_ascii_case(scheme) {
        return None;
    }
    Some(words.collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parts() {
        assert_eq!(scheme_parts(None, "token"), None);
        assert_eq!(scheme_parts(Some(""), "token"), None);
        assert_eq!(scheme_parts(Some("Bearer abc"), "token"), None);
        assert_eq!(scheme_parts(Some("Token"), "token"), Some(vec![]));
        assert_eq!(scheme_parts(Some("token abc"), "token"), Some(vec!["abc"]));
        assert_eq!(
            scheme_parts(Some("Token a b"), "token"),
            Some(vec!["a", "b"])
        );
    }
}
