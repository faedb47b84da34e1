//! Login Middleware
//!
//! Identifies the caller on protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use platform::cookie::extract_cookie;

use crate::application::config::LoginConfig;
use crate::application::{AuthenticateUseCase, RequestCredentials};
use crate::domain::backend::AuthBackend;
use crate::domain::repository::LoginRepository;
use crate::presentation::handlers::LoginAppState;

/// Lift the credential material the authentication classes look at
pub fn request_credentials(headers: &HeaderMap, config: &LoginConfig) -> RequestCredentials {
    RequestCredentials {
        session_cookie: extract_cookie(headers, &config.session_cookie_name),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    }
}

/// Middleware that requires an authenticated caller.
///
/// The resolved [`Principal`](crate::application::Principal) is stored in
/// the request extensions for the handler.
pub async fn require_authenticated<R, B>(
    State(state): State<LoginAppState<R, B>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: LoginRepository,
    B: AuthBackend + Send + Sync + 'static,
{
    let credentials = request_credentials(req.headers(), &state.config);

    let use_case = AuthenticateUseCase::new(
        state.repo.clone(),
        state.backend.clone(),
        state.config.clone(),
    );

    match use_case.require(&credentials).await {
        Ok(principal) => {
            tracing::debug!(
                user_id = %principal.user.user_id,
                via = %principal.via,
                "Request authenticated"
            );
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}
