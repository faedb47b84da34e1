//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain meaning:
//! - Cryptographic utilities (random keys, SHA-256, HMAC signing, Base64)
//! - Password hashing (Argon2id)
//! - Cookie building and parsing
//! - Client metadata from request headers

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
