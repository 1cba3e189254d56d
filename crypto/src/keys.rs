//! RSA signing key management and compact-JWS production for ID tokens (C1).
//!
//! The key is loaded from PEM at boot, or generated for local development if absent.
//! Access/refresh tokens never pass through this module: they are opaque handles,
//! see [`crate::codec`].

use std::path::Path;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs1v15::{SigningKey, VerifyingKey};
use rsa::pkcs8::EncodePublicKey;
use rsa::signature::{Keypair, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};

const MIN_KEY_BITS: usize = 2048;
const DEV_KEY_BITS: usize = 2048;

/// A single RSA key, its derived key ID, and the public JWKS projection.
pub struct SigningMaterial {
    kid: String,
    signing_key: SigningKey<Sha256>,
    verifying_key: VerifyingKey<Sha256>,
    public_key: RsaPublicKey,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JsonWebKey {
    pub kty: String,
    pub kid: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub usage: String,
    pub n: String,
    pub e: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JsonWebKey>,
}

impl SigningMaterial {
    /// Loads a PEM-encoded PKCS1 RSA private key from `path`. If `path` is `None` or
    /// the file does not exist, generates a fresh key — intended for development only.
    pub fn load_or_generate(path: Option<&Path>) -> CryptoResult<Self> {
        let private_key = match path.filter(|p| p.exists()) {
            Some(path) => {
                let pem = std::fs::read_to_string(path)
                    .map_err(|e| CryptoError::InvalidKey(format!("reading {path:?}: {e}")))?;
                RsaPrivateKey::from_pkcs1_pem(&pem)
                    .map_err(|e| CryptoError::InvalidKey(format!("parsing key PEM: {e}")))?
            }
            None => {
                tracing::warn!("no signing key configured; generating an ephemeral development key");
                let mut rng = rand::thread_rng();
                RsaPrivateKey::new(&mut rng, DEV_KEY_BITS)
                    .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?
            }
        };

        if private_key.size() * 8 < MIN_KEY_BITS {
            return Err(CryptoError::InvalidKey(format!(
                "key is smaller than the minimum {MIN_KEY_BITS} bits"
            )));
        }

        Self::from_private_key(private_key)
    }

    fn from_private_key(private_key: RsaPrivateKey) -> CryptoResult<Self> {
        let public_key = RsaPublicKey::from(&private_key);
        let kid = derive_kid(&public_key)?;
        let signing_key = SigningKey::<Sha256>::new(private_key);
        let verifying_key = signing_key.verifying_key();

        Ok(Self {
            kid,
            signing_key,
            verifying_key,
            public_key,
        })
    }

    /// Writes the private key out as PKCS1 PEM, for `ops-cli`'s key-rotation command.
    pub fn to_pem(&self) -> CryptoResult<String> {
        self.signing_key
            .as_ref()
            .to_pkcs1_pem(LineEnding::LF)
            .map(|doc| doc.to_string())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn jwks(&self) -> JwksResponse {
        JwksResponse {
            keys: vec![JsonWebKey {
                kty: "RSA".to_string(),
                kid: self.kid.clone(),
                alg: "RS256".to_string(),
                usage: "sig".to_string(),
                n: URL_SAFE_NO_PAD.encode(self.public_key.n().to_bytes_be()),
                e: URL_SAFE_NO_PAD.encode(self.public_key.e().to_bytes_be()),
            }],
        }
    }

    /// Signs `claims` as a compact RS256 JWS: `base64url(header).base64url(payload).base64url(sig)`.
    pub fn sign_id_token<T: Serialize>(&self, claims: &T) -> CryptoResult<String> {
        let header = serde_json::json!({ "alg": "RS256", "typ": "JWT", "kid": self.kid });
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signing_input = format!("{header_b64}.{payload_b64}");

        let signature = self.signing_key.sign(signing_input.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());

        Ok(format!("{signing_input}.{sig_b64}"))
    }

    /// Verifies a compact JWS produced by [`Self::sign_id_token`] and returns the decoded
    /// payload. Used by round-trip tests; sibling services should validate via the JWKS
    /// instead of holding a handle to this struct.
    pub fn verify_id_token(&self, token: &str) -> CryptoResult<Value> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(sig_b64)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(CryptoError::SignatureVerificationFailed);
        };
        if parts.next().is_some() {
            return Err(CryptoError::SignatureVerificationFailed);
        }

        let signing_input = format!("{header_b64}.{payload_b64}");
        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;
        let signature = rsa::pkcs1v15::Signature::try_from(sig_bytes.as_slice())
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;

        self.verifying_key
            .verify(signing_input.as_bytes(), &signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;
        serde_json::from_slice(&payload_bytes).map_err(CryptoError::Serialization)
    }
}

fn derive_kid(public_key: &RsaPublicKey) -> CryptoResult<String> {
    let der = public_key
        .to_public_key_der()
        .map_err(|e| CryptoError::InvalidKey(format!("DER-encoding public key: {e}")))?;
    let digest = Sha256::digest(der.as_bytes());
    Ok(hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_material() -> SigningMaterial {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
        SigningMaterial::from_private_key(key).expect("signing material")
    }

    #[test]
    fn jwks_exposes_one_key_with_matching_kid() {
        let material = test_material();
        let jwks = material.jwks();
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].kid, material.kid());
        assert_eq!(jwks.keys[0].alg, "RS256");
    }

    #[test]
    fn sign_then_verify_round_trips_claims() {
        let material = test_material();
        let claims = serde_json::json!({ "sub": "user-1", "aud": ["client-1"], "iss": "https://issuer.example" });
        let token = material.sign_id_token(&claims).expect("sign");
        let recovered = material.verify_id_token(&token).expect("verify");
        assert_eq!(recovered, claims);
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let material = test_material();
        let claims = serde_json::json!({ "sub": "user-1" });
        let token = material.sign_id_token(&claims).expect("sign");
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = "ZGVmaW5pdGVseS10YW1wZXJlZA";
        let tampered = parts.join(".");
        assert!(material.verify_id_token(&tampered).is_err());
    }
}
