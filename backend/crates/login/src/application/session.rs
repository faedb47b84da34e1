//! Session Cookie Tokens
//!
//! The cookie carries `"{session_id}.{base64url(HMAC-SHA256(secret, session_id))}"`.

use platform::crypto;

use crate::domain::value_object::SessionId;

/// Generate signed session token
pub fn sign_session_token(secret: &[u8], session_id: &SessionId) -> String {
    crypto::sign(secret, &session_id.to_string())
}

/// Parse and verify session token
pub fn parse_session_token(secret: &[u8], token: &str) -> Option<SessionId> {
    crypto::unsign(secret, token)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = &[7u8; 32];

    #[test]
    fn test_signed_token_parses_back() {
        let id = SessionId::new();
        let token = sign_session_token(SECRET, &id);
        assert!(token.starts_with(&id.to_string()));
        assert_eq!(parse_session_token(SECRET, &token), Some(id));
    }

    #[test]
    fn test_rejects_tampering() {
        let id = SessionId::new();
        let token = sign_session_token(SECRET, &id);

        assert_eq!(parse_session_token(&[8u8; 32], &token), None);

        let other = SessionId::new().to_string();
        let (_, signature) = token.rsplit_once('.').unwrap();
        assert_eq!(
            parse_session_token(SECRET, &format!("{other}.{signature}")),
            None
        );
        assert_eq!(parse_session_token(SECRET, &id.to_string()), None);
        assert_eq!(parse_session_token(SECRET, ""), None);
    }

    #[test]
    fn test_signed_garbage_is_not_a_session() {
        let token = crypto::sign(SECRET, "not-a-uuid");
        assert_eq!(parse_session_token(SECRET, &token), None);
    }
}
