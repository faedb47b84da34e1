//! Server Settings
//!
//! Everything the binary reads from the environment (and `.env`).

use anyhow::{Context, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose;
use login::config::{AuthenticationClass, MAX_SESSION_TTL, SameSite};
use login::models::login_field::LoginField;
use login::LoginConfig;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub login: LoginConfig,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// Debug builds fall back to a random session secret and insecure
    /// cookies; release builds require `SESSION_SECRET`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), cfg!(debug_assertions))
    }

    pub fn from_lookup<F>(lookup: F, development: bool) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let mut login = match var("SESSION_SECRET") {
            Some(secret_b64) => LoginConfig {
                session_secret: decode_secret(&secret_b64)?,
                cookie_secure: !development,
                ..LoginConfig::default()
            },
            None if development => LoginConfig::development(),
            None => bail!("SESSION_SECRET must be set in production"),
        };

        if let Some(secure) = var("COOKIE_SECURE") {
            login.cookie_secure = parse_bool("COOKIE_SECURE", &secure)?;
        }
        if let Some(same_site) = var("COOKIE_SAME_SITE") {
            login.cookie_same_site = SameSite::parse(&same_site)
                .ok_or_else(|| anyhow!("COOKIE_SAME_SITE must be Strict, Lax or None"))?;
        }
        if let Some(pepper) = var("PASSWORD_PEPPER") {
            login.password_pepper = Some(pepper.into_bytes());
        }
        if let Some(fields) = var("USER_LOGIN_FIELDS") {
            login.user_login_fields = Some(parse_list::<LoginField>(&fields)?);
        }
        if let Some(flag) = var("LOGIN_AUTHENTICATE_SESSION") {
            login.login_authenticate_session =
                Some(parse_bool("LOGIN_AUTHENTICATE_SESSION", &flag)?);
        }
        if let Some(flag) = var("LOGIN_RETRIEVE_TOKEN") {
            login.login_retrieve_token = Some(parse_bool("LOGIN_RETRIEVE_TOKEN", &flag)?);
        }
        if let Some(classes) = var("DEFAULT_AUTHENTICATION_CLASSES") {
            login.default_authentication_classes = parse_list::<AuthenticationClass>(&classes)?;
        }
        if let Some(ttl) = var("SESSION_TTL_SECS") {
            let secs: u64 = ttl.parse().context("SESSION_TTL_SECS must be a number")?;
            if secs == 0 || secs > MAX_SESSION_TTL.as_secs() {
                bail!(
                    "SESSION_TTL_SECS must be between 1 and {}, got {secs}",
                    MAX_SESSION_TTL.as_secs()
                );
            }
            login.session_ttl = Duration::from_secs(secs);
        }

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            login,
        })
    }
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(secret_b64)
        .context("SESSION_SECRET is not valid base64")?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow!("SESSION_SECRET must be 32 bytes, got {}", bytes.len()))
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} must be a boolean, got {value:?}"),
    }
}

fn parse_list<T>(value: &str) -> anyhow::Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(anyhow::Error::from))
        .collect()
}
