//! Login Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, auth backends
//! - `application/` - Use cases and configuration
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, extractors, router
//!
//! ## Endpoints
//! - `POST /login` - Resolve the caller through the configured login
//!   fields, then start a session and/or return the user's token
//! - `POST /logout` - End the session and optionally revoke the token
//!
//! ## Request authentication
//! Session cookie, `Authorization: Token <key>` and
//! `Authorization: Basic <credentials>`, tried in the configured order.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthenticationClass, LoginConfig, UserModelConfig};
pub use error::{LoginError, LoginResult};
pub use infra::{memory::MemoryLoginRepository, postgres::PgLoginRepository};
pub use presentation::router::login_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::MemoryLoginRepository as MemoryStore;
    pub use crate::infra::postgres::PgLoginRepository as LoginStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
