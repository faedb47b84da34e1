//! Entities

pub mod auth_session;
pub mod auth_token;
pub mod user;
