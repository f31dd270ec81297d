//! Webhook signature verification.
//!
//! Paystack signs every webhook delivery with HMAC-SHA512 over the exact raw bytes of the
//! request body, keyed with the account's secret key, and sends the hex digest in the
//! `x-paystack-signature` header. A payload whose signature does not match must be discarded
//! without looking at its contents.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Computes the hex-encoded HMAC-SHA512 signature for the given payload.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks a provided signature header against the HMAC of the raw payload bytes.
/// The comparison is constant-time (via [`Mac::verify_slice`]); a malformed hex header simply
/// fails the check.
pub fn signature_matches(secret: &str, payload: &[u8], provided: &str) -> bool {
    let provided = match hex::decode(provided.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload);
    mac.verify_slice(&provided).is_ok()
}
