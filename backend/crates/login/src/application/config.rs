//! Application Configuration
//!
//! Login behaviour flags, the user model description and session cookie
//! settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::domain::value_object::login_field::LoginField;

/// Ways a request can identify its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthenticationClass {
    /// Signed session cookie
    Session,
    /// `Authorization: Token <key>`
    Token,
    /// `Authorization: Basic <base64(user:pass)>`
    Basic,
}

impl AuthenticationClass {
    /// `WWW-Authenticate` value sent with 401 responses, if any.
    ///
    /// Session authentication has no challenge, so failures under it are 403.
    pub fn challenge(&self) -> Option<&'static str> {
        match self {
            AuthenticationClass::Session => None,
            AuthenticationClass::Token => Some("Token"),
            AuthenticationClass::Basic => Some("Basic realm=\"api\""),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationClass::Session => "session",
            AuthenticationClass::Token => "token",
            AuthenticationClass::Basic => "basic",
        }
    }
}

impl fmt::Display for AuthenticationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown authentication class name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown authentication class: {0}")]
pub struct UnknownAuthenticationClass(pub String);

impl FromStr for AuthenticationClass {
    type Err = UnknownAuthenticationClass;

    /// Accepts `session`, `token`, `basic` as well as dotted class paths such
    /// as `rest_framework.authentication.TokenAuthentication`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().rsplit('.').next().unwrap_or_default();
        let name = name.to_ascii_lowercase();
        let name = name.strip_suffix("authentication").unwrap_or(&name);

        match name {
            "session" => Ok(AuthenticationClass::Session),
            "token" => Ok(AuthenticationClass::Token),
            "basic" => Ok(AuthenticationClass::Basic),
            _ => Err(UnknownAuthenticationClass(s.to_string())),
        }
    }
}

/// Shape of the user model as far as login is concerned
#[derive(Debug, Clone)]
pub struct UserModelConfig {
    /// Field used when nothing else is configured, and by basic auth
    pub username_field: LoginField,
    /// Model-level list of login fields
    pub login_fields: Option<Vec<LoginField>>,
}

impl Default for UserModelConfig {
    fn default() -> Self {
        Self {
            username_field: LoginField::Username,
            login_fields: None,
        }
    }
}

/// Login application configuration
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Login fields, overriding the user model's
    pub user_login_fields: Option<Vec<LoginField>>,
    /// Start a session on login; `None` follows the registered classes
    pub login_authenticate_session: Option<bool>,
    /// Return a token on login; `None` follows the registered classes
    pub login_retrieve_token: Option<bool>,
    /// Registered request authentication classes, in order
    pub default_authentication_classes: Vec<AuthenticationClass>,
    pub user_model: UserModelConfig,
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Session lifetime (2 weeks)
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

/// Longest session lifetime accepted from settings (one year)
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            user_login_fields: None,
            login_authenticate_session: None,
            login_retrieve_token: None,
            default_authentication_classes: vec![
                AuthenticationClass::Session,
                AuthenticationClass::Basic,
            ],
            user_model: UserModelConfig::default(),
            session_cookie_name: "sessionid".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(14 * 24 * 3600), // 2 weeks
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
        }
    }
}

impl LoginConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Fields tried, in order, when resolving a login identifier.
    ///
    /// The first non-empty of the configured list, the user model's list,
    /// or the model's username field alone.
    pub fn login_fields(&self) -> &[LoginField] {
        match (&self.user_login_fields, &self.user_model.login_fields) {
            (Some(fields), _) if !fields.is_empty() => fields,
            (_, Some(fields)) if !fields.is_empty() => fields,
            _ => std::slice::from_ref(&self.user_model.username_field),
        }
    }

    pub fn has_authentication_class(&self, class: AuthenticationClass) -> bool {
        self.default_authentication_classes.contains(&class)
    }

    pub fn should_authenticate_session(&self) -> bool {
        self.login_authenticate_session
            .unwrap_or_else(|| self.has_authentication_class(AuthenticationClass::Session))
    }

    pub fn should_retrieve_token(&self) -> bool {
        self.login_retrieve_token
            .unwrap_or_else(|| self.has_authentication_class(AuthenticationClass::Token))
    }

    /// Challenge of the first registered class; decides 401 versus 403
    pub fn challenge(&self) -> Option<&'static str> {
        self.default_authentication_classes
            .first()
            .and_then(AuthenticationClass::challenge)
    }

    /// Session TTL as a signed delta; `None` when it does not fit
    pub fn session_ttl_delta(&self) -> Option<chrono::TimeDelta> {
        chrono::TimeDelta::from_std(self.session_ttl).ok()
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age: Some(self.session_ttl),
        }
    }
}
