//! Login Error Types
//!
//! Login-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::{AppError, FieldErrors};
use kernel::error::kind::ErrorKind;
use thiserror::Error;

/// Login-specific result type alias
pub type LoginResult<T> = Result<T, LoginError>;

/// Login-specific error variants
#[derive(Debug, Error)]
pub enum LoginError {
    /// No backend accepted the credentials on any login field
    #[error("Login or password invalid.")]
    InvalidCredentials,

    /// Revoke requested but the user has no token
    #[error("Cannot remove non-existent token")]
    TokenNotFound,

    /// Input failed field validation
    #[error("Invalid input: {0:?}")]
    Validation(FieldErrors),

    /// Request body could not be parsed
    #[error("{0}")]
    MalformedBody(String),

    /// Request body is not JSON
    #[error("Unsupported media type \"{0}\" in request.")]
    UnsupportedMediaType(String),

    /// No credentials were presented to an endpoint that requires them.
    ///
    /// `challenge` is the `WWW-Authenticate` value of the first configured
    /// authentication class, if it has one.
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated { challenge: Option<&'static str> },

    /// Credentials were presented but rejected
    #[error("{reason}")]
    AuthenticationFailed {
        reason: &'static str,
        challenge: Option<&'static str>,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LoginError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoginError::InvalidCredentials
            | LoginError::TokenNotFound
            | LoginError::Validation(_)
            | LoginError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            LoginError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            LoginError::NotAuthenticated { challenge }
            | LoginError::AuthenticationFailed { challenge, .. } => match challenge {
                Some(_) => StatusCode::UNAUTHORIZED,
                None => StatusCode::FORBIDDEN,
            },
            LoginError::Database(_) | LoginError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status_code() {
            StatusCode::BAD_REQUEST => ErrorKind::BadRequest,
            StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
            StatusCode::FORBIDDEN => ErrorKind::Forbidden,
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ErrorKind::UnsupportedMediaType,
            _ => ErrorKind::InternalServerError,
        }
    }

    /// Client-facing error. Server-side failures never leak their cause.
    pub fn to_app_error(&self) -> AppError {
        match self {
            LoginError::Validation(errors) => AppError::from_field_errors(errors.clone()),
            LoginError::Database(_) | LoginError::Internal(_) => {
                AppError::internal("A server error occurred.")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn challenge(&self) -> Option<&'static str> {
        match self {
            LoginError::NotAuthenticated { challenge }
            | LoginError::AuthenticationFailed { challenge, .. } => *challenge,
            _ => None,
        }
    }

    fn log(&self) {
        match self {
            LoginError::Database(e) => {
                tracing::error!(error = %e, "Login database error");
            }
            LoginError::Internal(msg) => {
                tracing::error!(message = %msg, "Login internal error");
            }
            LoginError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            LoginError::AuthenticationFailed { reason, .. } => {
                tracing::warn!(reason = %reason, "Request authentication failed");
            }
            _ => {
                tracing::debug!(error = %self, "Login error");
            }
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let challenge = self.challenge();

        let mut response = self.to_app_error().into_response();
        *response.status_mut() = status;
        if let Some(challenge) = challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
        }
        response
    }
}

impl From<AppError> for LoginError {
    fn from(err: AppError) -> Self {
        if err.is_validation() {
            LoginError::Validation(err.field_errors().clone())
        } else if err.is_server_error() {
            LoginError::Internal(err.to_string())
        } else {
            LoginError::MalformedBody(err.message().to_string())
        }
    }
}

impl From<platform::password::PasswordHashError> for LoginError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        LoginError::Internal(err.to_string())
    }
}
