//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod login;
pub mod logout;
pub mod session;

// Re-exports
pub use authenticate::{AuthenticateUseCase, Principal, RequestCredentials};
pub use config::{AuthenticationClass, LoginConfig, UserModelConfig};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::{LogoutInput, LogoutOutput, LogoutUseCase};
