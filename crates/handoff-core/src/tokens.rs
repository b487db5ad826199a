//! Random identifiers and secret hashing.

/// Generate random bytes of the specified length
pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// URL-safe base64 encoding without padding
pub fn base64_url_encode(data: &[u8]) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    URL_SAFE_NO_PAD.encode(data)
}

/// SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hex SHA-256, the stored form of a bearer secret.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Share token: 24 random bytes as 48 hex characters.
pub fn new_share_token() -> String {
    hex::encode(generate_random_bytes::<24>())
}

/// Inbox item and session ids: 20 random bytes as 40 hex characters.
pub fn new_delivery_id() -> String {
    hex::encode(generate_random_bytes::<20>())
}

/// Access request id: 16 random bytes as 32 hex characters.
pub fn new_request_id() -> String {
    hex::encode(generate_random_bytes::<16>())
}

/// Bearer secret issued once at registration: 24 random bytes, URL-safe
/// base64 without padding.
pub fn new_bearer_secret() -> String {
    base64_url_encode(&generate_random_bytes::<24>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_formats() {
        let token = new_share_token();
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(new_delivery_id().len(), 40);
        assert_eq!(new_request_id().len(), 32);
    }

    #[test]
    fn test_bearer_secret_is_unpadded() {
        let secret = new_bearer_secret();
        assert_eq!(secret.len(), 32);
        assert!(!secret.contains('='));
    }

    #[test]
    fn test_sha256_hex_is_stable() {
        let a = sha256_hex(b"secret");
        let b = sha256_hex(b"secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, sha256_hex(b"other"));
    }
}
