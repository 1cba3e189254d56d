//! Opaque token handle minting and hashing (C2).
//!
//! Access and refresh tokens are never JWTs: a handle is 128 bits of randomness,
//! URL-safe base64 encoded, and only its HMAC-SHA256 hash is ever persisted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

const HANDLE_BYTES: usize = 16; // 128 bits
const MIN_SECRET_BYTES: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Mints opaque handles and computes their storage hash with a process-wide HMAC secret.
pub struct TokenCodec {
    secret: Zeroizing<Vec<u8>>,
    mac_template: HmacSha256,
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> CryptoResult<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(CryptoError::InvalidKey(format!(
                "token codec secret must be at least {MIN_SECRET_BYTES} bytes, got {}",
                secret.len()
            )));
        }
        // HMAC has no key-length restriction, but `new_from_slice` still returns a
        // `Result`; surface a real error here instead of unwrapping, so the only
        // fallible construction happens once, at codec creation.
        let mac_template = HmacSha256::new_from_slice(&secret)
            .map_err(|e| CryptoError::InvalidKey(format!("failed to initialize HMAC: {e}")))?;
        Ok(Self {
            secret: Zeroizing::new(secret),
            mac_template,
        })
    }

    /// Generates a fresh opaque handle and its hash. The handle is returned to the
    /// issuing client exactly once; only `hash` is persisted.
    pub fn mint(&self) -> (String, String) {
        let mut bytes = [0u8; HANDLE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let handle = URL_SAFE_NO_PAD.encode(bytes);
        let hash = self.hash(&handle);
        (handle, hash)
    }

    /// Lowercase hex of HMAC-SHA256(secret, handle).
    pub fn hash(&self, handle: &str) -> String {
        let mut mac = self.mac_template.clone();
        mac.update(handle.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time comparison of two hash hex strings (for callers that received a
    /// hash from an untrusted source and must compare it to a stored value).
    pub fn hashes_match(a: &str, b: &str) -> bool {
        a.as_bytes().ct_eq(b.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(vec![7u8; 32]).expect("valid secret length")
    }

    #[test]
    fn rejects_short_secrets() {
        assert!(TokenCodec::new(vec![1u8; 16]).is_err());
    }

    #[test]
    fn mint_produces_matching_hash() {
        let codec = codec();
        let (handle, hash) = codec.mint();
        assert_eq!(codec.hash(&handle), hash);
    }

    #[test]
    fn distinct_mints_are_distinct() {
        let codec = codec();
        let (h1, _) = codec.mint();
        let (h2, _) = codec.mint();
        assert_ne!(h1, h2);
    }

    #[test]
    fn hashes_match_is_constant_time_equality() {
        let codec = codec();
        let (handle, hash) = codec.mint();
        assert!(TokenCodec::hashes_match(&hash, &codec.hash(&handle)));
        assert!(!TokenCodec::hashes_match(&hash, "0000"));
    }
}
