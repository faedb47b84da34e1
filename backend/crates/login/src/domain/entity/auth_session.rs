//! Auth Session Entity
//!
//! Server-side session; the client only holds a signed reference to it.

use chrono::{DateTime, Duration, Utc};
use platform::client::ClientInfo;

use crate::domain::value_object::{SessionId, UserId};

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Client IP (for logging)
    pub client_ip: Option<String>,
    /// User agent string (for session management display)
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    /// TTL is provided by the application layer (config), not hard-coded here.
    ///
    /// `None` when the expiry does not fit in a timestamp.
    pub fn new(user_id: UserId, ttl: Duration, client: &ClientInfo) -> Option<Self> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl)?;

        Some(Self {
            session_id: SessionId::new(),
            user_id,
            expires_at_ms: expires_at.timestamp_millis(),
            client_ip: client.ip_string(),
            user_agent: client.user_agent.clone(),
            created_at: now,
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }
}
