//! Login Field Value Object
//!
//! A user attribute that may serve as the login identifier.

use derive_more::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LoginField {
    #[display("username")]
    Username,
    #[display("email")]
    Email,
}

/// Unknown login field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown login field: {0}")]
pub struct UnknownLoginField(pub String);

impl LoginField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginField::Username => "username",
            LoginField::Email => "email",
        }
    }
}

impl FromStr for LoginField {
    type Err = UnknownLoginField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "username" => Ok(LoginField::Username),
            "email" => Ok(LoginField::Email),
            _ => Err(UnknownLoginField(s.to_string())),
        }
    }
}
