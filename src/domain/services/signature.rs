use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `body` keyed by `secret`, as lowercase hex.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Trim, drop an optional `0x`/`0X` prefix and lowercase a received signature.
pub fn normalize_signature(value: &str) -> String {
    let trimmed = value.trim();
    let without_prefix = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    without_prefix.to_ascii_lowercase()
}

/// Compare two hex digests in constant time over their decoded bytes.
///
/// Length mismatches and undecodable input return `false` before any byte comparison.
pub fn signatures_match(expected_hex: &str, received_hex: &str) -> bool {
    let (Ok(expected), Ok(received)) = (hex::decode(expected_hex), hex::decode(received_hex))
    else {
        return false;
    };
    if expected.is_empty() || expected.len() != received.len() {
        return false;
    }
    expected.ct_eq(received.as_slice()).into()
}

/// Verify a signature header against the body. A missing secret or header is simply invalid.
pub fn verify(secret: Option<&str>, body: &[u8], header: Option<&str>) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return false;
    };
    let Some(header) = header else {
        return false;
    };
    let received = normalize_signature(header);
    if received.is_empty() {
        return false;
    }
    signatures_match(&sign(secret, body), &received)
}
