//! Login Router

use axum::{Router, middleware, routing::post};
use std::sync::Arc;

use crate::application::config::LoginConfig;
use crate::domain::backend::{AuthBackend, ModelBackend};
use crate::domain::repository::LoginRepository;
use crate::infra::postgres::PgLoginRepository;
use crate::presentation::handlers::{self, LoginAppState};
use crate::presentation::middleware::require_authenticated;

/// Create the login router with PostgreSQL repository
pub fn login_router(repo: PgLoginRepository, config: LoginConfig) -> Router {
    login_router_generic(repo, config)
}

/// Create a login router for any repository implementation, authenticating
/// against the repository's users
pub fn login_router_generic<R>(repo: R, config: LoginConfig) -> Router
where
    R: LoginRepository,
{
    let repo = Arc::new(repo);
    let backend = ModelBackend::new(repo.clone(), config.password_pepper.clone());
    login_router_with_backend(repo, backend, config)
}

/// Create a login router with a custom authentication backend
pub fn login_router_with_backend<R, B>(repo: Arc<R>, backend: B, config: LoginConfig) -> Router
where
    R: LoginRepository,
    B: AuthBackend + Send + Sync + 'static,
{
    let state = LoginAppState {
        repo,
        backend: Arc::new(backend),
        config: Arc::new(config),
    };

    Router::new()
        .route("/login", post(handlers::login::<R, B>))
        .route(
            "/logout",
            post(handlers::logout::<R, B>).route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_authenticated::<R, B>,
            )),
        )
        .with_state(state)
}
