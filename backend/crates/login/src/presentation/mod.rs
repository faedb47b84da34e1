//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::LoginAppState;
pub use middleware::require_authenticated;
pub use router::{login_router, login_router_generic, login_router_with_backend};
