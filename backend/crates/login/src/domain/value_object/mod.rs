//! Value Object Module

pub mod login_field;
pub mod token_key;

pub use kernel::id::{SessionId, UserId};
