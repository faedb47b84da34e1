//! Error conversions - From implementations and framework integration
//!
//! Converts common error types into [`AppError`] and renders it as an
//! HTTP response when the `axum` feature is enabled.

use super::app_error::{AppError, NON_FIELD_ERRORS};

// ============================================================================
// serde_json conversions
// ============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            AppError::bad_request(format!("JSON parse error - {}", err)).with_source(err)
        } else if err.is_data() {
            AppError::validation(NON_FIELD_ERRORS, err.to_string()).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.to_body())).into_response()
    }
}
