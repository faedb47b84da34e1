//! API DTOs (Data Transfer Objects)

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::LoginResult;
use crate::presentation::extract::Validator;

// ============================================================================
// Login
// ============================================================================

/// Login request
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Value of any configured login field
    pub login: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(data: &Map<String, Value>) -> LoginResult<Self> {
        let mut v = Validator::new();
        let login = v.char_field(data, "login");
        let password = v.char_field(data, "password");
        v.finish()?;

        Ok(Self {
            login: login.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl LoginResponse {
    pub fn new(token: Option<String>) -> Self {
        Self {
            status: "Login successful",
            token,
        }
    }
}

// ============================================================================
// Logout
// ============================================================================

/// Logout request
#[derive(Debug, Clone, Default)]
pub struct LogoutRequest {
    pub revoke_token: bool,
}

impl LogoutRequest {
    pub fn validate(data: &Map<String, Value>) -> LoginResult<Self> {
        let mut v = Validator::new();
        let revoke_token = v.boolean_field(data, "revoke_token", false);
        v.finish()?;

        Ok(Self { revoke_token })
    }
}

/// Logout response
#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub status: &'static str,
}

impl Default for LogoutResponse {
    fn default() -> Self {
        Self {
            status: "Logout successful",
        }
    }
}
