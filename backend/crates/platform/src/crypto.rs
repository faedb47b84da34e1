//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Random bytes rendered as lower-case hex (`2 * len` characters)
pub fn random_hex(len: usize) -> String {
    hex::encode(random_bytes(len))
}

/// Encode bytes as standard base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64 to bytes
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    // HMAC accepts keys of any length, new_from_slice cannot fail
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC can take key of any size"),
    };
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Sign a value: `"{value}.{base64url(HMAC-SHA256(key, value))}"`
pub fn sign(key: &[u8], value: &str) -> String {
    let signature = hmac_sha256(key, value.as_bytes());
    format!(
        "{}.{}",
        value,
        general_purpose::URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Verify a value produced by [`sign`] and return the original value.
///
/// Returns `None` for malformed input or a bad signature. The signature is
/// compared in constant time.
pub fn unsign<'a>(key: &[u8], signed: &'a str) -> Option<&'a str> {
    let (value, signature_b64) = signed.rsplit_once('.')?;
    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .ok()?;

    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(value.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(value)
}
