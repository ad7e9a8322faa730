//! 요청 본문 서명 (HMAC-SHA256)

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 본문 바이트에 대한 HMAC-SHA256 hex 서명
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// 서명 검증 (상수 시간 비교)
pub fn verify(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vector() {
        assert_eq!(
            sign("key", b"The quick brown fox jumps over the lazy dog"),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn verify_accepts_own_signature() {
        let body = br#"{"room_id":"r1"}"#;
        let signature = sign("secret", body);
        assert!(verify("secret", body, &signature));
        assert!(verify("secret", body, &signature.to_uppercase()));
    }

    #[test]
    fn verify_rejects_tampering() {
        let signature = sign("secret", br#"{"room_id":"r1"}"#);
        assert!(!verify("secret", br#"{"room_id":"r2"}"#, &signature));
        assert!(!verify("other", br#"{"room_id":"r1"}"#, &signature));
        assert!(!verify("secret", br#"{"room_id":"r1"}"#, "not-hex"));
    }
}
