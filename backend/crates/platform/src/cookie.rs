//! Cookie Management Infrastructure
//!
//! Building `Set-Cookie` values and reading the `Cookie` request header.

use axum::http::{HeaderMap, HeaderValue, header};
use std::time::Duration;

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    /// Parse a case-insensitive policy name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// Attributes shared by the cookie that is set and the one that clears it
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Option<Duration>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "sessionid".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age: None,
        }
    }
}

impl CookieConfig {
    fn attributes(&self) -> String {
        let mut attrs = String::new();
        if self.http_only {
            attrs.push_str("; HttpOnly");
        }
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs.push_str("; SameSite=");
        attrs.push_str(self.same_site.as_str());
        attrs.push_str("; Path=");
        attrs.push_str(&self.path);
        attrs
    }

    /// `Set-Cookie` value storing `value`
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}{}", self.name, value, self.attributes());
        if let Some(max_age) = self.max_age {
            cookie.push_str(&format!("; Max-Age={}", max_age.as_secs()));
        }
        cookie
    }

    /// `Set-Cookie` value that makes the browser drop the cookie
    pub fn build_delete_cookie(&self) -> String {
        format!(
            "{}=\"\"{}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name,
            self.attributes()
        )
    }
}

/// Extract a cookie value from the request headers.
///
/// Every `Cookie` header is searched; the first pair named `name` wins.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

/// Header value for a `Set-Cookie` string.
///
/// Returns `None` if the string contains bytes not allowed in a header.
pub fn to_header_value(cookie: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(cookie).ok()
}
