//! Request Extractors and Field Validation
//!
//! Bodies are read as a JSON object and validated field by field so that
//! every problem is reported at once, keyed by field name.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Request};
use axum::http::{header, request::Parts};
use kernel::error::app_error::{AppError, FieldErrors, NON_FIELD_ERRORS};
use platform::client::{ClientInfo, extract_client_info};
use serde_json::{Map, Value};

use crate::error::LoginError;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";

/// Request body as a JSON object. An empty body is an empty object.
#[derive(Debug, Default)]
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = LoginError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| LoginError::MalformedBody(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonObject::default());
        }

        if let Some(content_type) = content_type.filter(|ct| !is_json(ct)) {
            return Err(LoginError::UnsupportedMediaType(content_type));
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(AppError::from)?;
        match value {
            Value::Object(map) => Ok(JsonObject(map)),
            other => Err(AppError::validation(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type_name(&other)
                ),
            )
            .into()),
        }
    }
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json")
        || essence.to_ascii_lowercase().ends_with("+json")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Caller address and user agent
#[derive(Debug, Clone, Default)]
pub struct ClientMeta(pub ClientInfo);

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        Ok(ClientMeta(extract_client_info(&parts.headers, direct_ip)))
    }
}

/// Collects per-field errors while a body is validated
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Required string; surrounding whitespace is trimmed and numbers are
    /// taken as their decimal text.
    pub fn char_field(&mut self, data: &Map<String, Value>, field: &str) -> Option<String> {
        let text = match data.get(field) {
            None => {
                self.reject(field, REQUIRED);
                return None;
            }
            Some(Value::Null) => {
                self.reject(field, NOT_NULL);
                return None;
            }
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                self.reject(field, NOT_A_STRING);
                return None;
            }
        };

        if text.is_empty() {
            self.reject(field, NOT_BLANK);
            return None;
        }
        Some(text)
    }

    /// Optional boolean with a default
    pub fn boolean_field(&mut self, data: &Map<String, Value>, field: &str, default: bool) -> bool {
        let parsed = match data.get(field) {
            None => return default,
            Some(Value::Null) => {
                self.reject(field, NOT_NULL);
                return default;
            }
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v == 1.0 => Some(true),
                Some(v) if v == 0.0 => Some(false),
                _ => None,
            },
            Some(Value::String(s)) => parse_bool_text(s),
            Some(_) => None,
        };

        parsed.unwrap_or_else(|| {
            self.reject(field, NOT_A_BOOLEAN);
            default
        })
    }

    /// Fails with every collected field error, if any
    pub fn finish(self) -> Result<(), LoginError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(LoginError::Validation(self.errors))
        }
    }
}

fn parse_bool_text(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}
