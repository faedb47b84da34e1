//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary every crate in the workspace agrees on:
//! - Error classification and the HTTP error body
//! - Typed UUID identifiers
//!
//! Only things with the same meaning in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
