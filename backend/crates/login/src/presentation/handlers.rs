//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::cookie::{extract_cookie, to_header_value};
use platform::password::ClearTextPassword;

use crate::application::config::LoginConfig;
use crate::application::{LoginInput, LoginUseCase, LogoutInput, LogoutUseCase, Principal};
use crate::domain::backend::AuthBackend;
use crate::domain::repository::LoginRepository;
use crate::error::{LoginError, LoginResult};
use crate::presentation::dto::{LoginRequest, LoginResponse, LogoutRequest, LogoutResponse};
use crate::presentation::extract::{ClientMeta, JsonObject};

/// Shared state for login handlers
pub struct LoginAppState<R, B> {
    pub repo: Arc<R>,
    pub backend: Arc<B>,
    pub config: Arc<LoginConfig>,
}

impl<R, B> Clone for LoginAppState<R, B> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            backend: Arc::clone(&self.backend),
            config: Arc::clone(&self.config),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /login
pub async fn login<R, B>(
    State(state): State<LoginAppState<R, B>>,
    ClientMeta(client): ClientMeta,
    headers: HeaderMap,
    JsonObject(data): JsonObject,
) -> LoginResult<Response>
where
    R: LoginRepository,
    B: AuthBackend + Send + Sync + 'static,
{
    let req = LoginRequest::validate(&data)?;

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.backend.clone(),
        state.config.clone(),
    );

    let input = LoginInput {
        login: req.login,
        password: ClearTextPassword::new(req.password),
        current_session: extract_cookie(&headers, &state.config.session_cookie_name),
    };

    let output = use_case.execute(input, &client).await?;

    let body = Json(LoginResponse::new(output.token.map(|t| t.into_string())));
    let mut response = body.into_response();

    if let Some(session_token) = output.session_token {
        let cookie = state.config.session_cookie().build_set_cookie(&session_token);
        let value = to_header_value(&cookie)
            .ok_or_else(|| LoginError::Internal("Session cookie is not a valid header".into()))?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}

// ============================================================================
// Logout
// ============================================================================

/// POST /logout (requires authentication)
pub async fn logout<R, B>(
    State(state): State<LoginAppState<R, B>>,
    Extension(principal): Extension<Principal>,
    headers: HeaderMap,
    JsonObject(data): JsonObject,
) -> LoginResult<Response>
where
    R: LoginRepository,
    B: AuthBackend + Send + Sync + 'static,
{
    let req = LogoutRequest::validate(&data)?;

    let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());

    let input = LogoutInput {
        user_id: principal.user.user_id,
        current_session: extract_cookie(&headers, &state.config.session_cookie_name),
        revoke_token: req.revoke_token,
    };

    let result = use_case.execute(input).await;

    // A failed revoke still ended the session, so the cookie goes either way
    let clear_cookie = match &result {
        Ok(output) => output.session_ended,
        Err(LoginError::TokenNotFound) => state.config.should_authenticate_session(),
        Err(_) => false,
    };

    let mut response = match result {
        Ok(_) => Json(LogoutResponse::default()).into_response(),
        Err(e) => e.into_response(),
    };

    if clear_cookie {
        let cookie = state.config.session_cookie().build_delete_cookie();
        if let Some(value) = to_header_value(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    Ok(response)
}
