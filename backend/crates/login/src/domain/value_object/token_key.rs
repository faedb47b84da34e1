//! Token Key Value Object
//!
//! The opaque string a client presents as `Authorization: Token <key>`.

use std::fmt;

/// 40 lower-case hex characters (20 random bytes)
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenKey(String);

impl TokenKey {
    /// Random bytes behind a key
    pub const BYTES: usize = 20;
    /// Length of the hex form
    pub const LEN: usize = Self::BYTES * 2;

    pub fn generate() -> Self {
        Self(platform::crypto::random_hex(Self::BYTES))
    }

    /// Wrap a stored key without checking its shape
    pub fn from_db(key: String) -> Self {
        Self(key)
    }

    /// Accept a client-presented key if it could possibly be one of ours.
    ///
    /// Keys compare exactly, so upper-case hex is rejected rather than folded.
    pub fn parse(key: &str) -> Option<Self> {
        let well_formed = key.len() == Self::LEN
            && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        well_formed.then(|| Self(key.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys are bearer credentials; only a prefix goes to logs.
        write!(f, "TokenKey({}…)", &self.0[..self.0.len().min(6)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let key = TokenKey::generate();
        assert_eq!(key.as_str().len(), TokenKey::LEN);
        assert!(TokenKey::parse(key.as_str()).is_some());
        assert_ne!(key, TokenKey::generate());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TokenKey::parse("short").is_none());
        assert!(TokenKey::parse(&"z".repeat(TokenKey::LEN)).is_none());
        assert!(TokenKey::parse(&"AB".repeat(20)).is_none());
        assert_eq!(
            TokenKey::parse(&"ab".repeat(20)).unwrap().as_str(),
            "ab".repeat(20)
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let key = TokenKey::from_db("0123456789abcdef0123456789abcdef01234567".into());
        let debug = format!("{:?}", key);
        assert!(!debug.contains("0123456789abcdef0123"));
    }
}
