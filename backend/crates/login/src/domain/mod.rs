//! Domain Layer
//!
//! Contains entities, value objects, repository traits and authentication
//! backends.

pub mod backend;
pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use backend::{AuthBackend, Chain, Credentials, ModelBackend};
pub use entity::{auth_session::AuthSession, auth_token::AuthToken, user::User};
pub use repository::{
    AuthSessionRepository, AuthTokenRepository, LoginRepository, UserRepository,
};
