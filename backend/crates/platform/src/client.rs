//! Client identification utilities
//!
//! Request metadata recorded alongside server-side sessions.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Longest User-Agent we keep; anything beyond is cut off.
pub const MAX_USER_AGENT_LEN: usize = 512;

/// Who sent the request, as far as the headers tell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// User-Agent string, truncated to [`MAX_USER_AGENT_LEN`] characters
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// IP as string (for database storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Collect client metadata from the request headers
pub fn extract_client_info(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> ClientInfo {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect());

    ClientInfo {
        ip: extract_client_ip(headers, direct_ip),
        user_agent,
    }
}

/// Extract client IP address from headers.
///
/// The first entry of X-Forwarded-For wins (reverse proxy setups), then the
/// direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}
