//! Session Manager (C5): signs and verifies the `idsess` cookie, §4.5.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{IdentityError, Result};

pub const SESSION_COOKIE_NAME: &str = "idsess";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionPayload {
    sub: Uuid,
    exp: i64,
}

pub struct SessionManager {
    secret: Vec<u8>,
    lifespan: Duration,
    secure: bool,
}

impl SessionManager {
    /// `secure` mirrors the deployment environment: `true` in production adds the
    /// `Secure` cookie attribute, `false` is used for local/dev HTTP.
    pub fn new(secret: impl Into<Vec<u8>>, lifespan: Duration, secure: bool) -> Self {
        Self {
            secret: secret.into(),
            lifespan,
            secure,
        }
    }

    /// Builds the `Set-Cookie` value for a successful login.
    pub fn set(&self, user_id: Uuid) -> Result<String> {
        let payload = SessionPayload {
            sub: user_id,
            exp: (Utc::now() + self.lifespan).timestamp(),
        };
        let cookie_value = self.sign(&payload)?;
        Ok(self.cookie_attrs(&cookie_value, None))
    }

    /// The `Set-Cookie` value that clears the session: an empty value with an
    /// expiry in the past and `Max-Age=-1`, per §4.5.
    pub fn clear(&self) -> String {
        self.cookie_attrs("", Some("Thu, 01 Jan 1970 00:00:00 GMT"))
    }

    /// Verifies a cookie value and returns the subject, rejecting a missing
    /// separator, bad base64, HMAC mismatch, or an expired payload.
    pub fn verify(&self, cookie_value: &str) -> Result<Uuid> {
        let (payload_b64, mac_b64) = cookie_value
            .split_once('.')
            .ok_or(IdentityError::InvalidSession)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| IdentityError::InvalidSession)?;
        let mac_bytes = URL_SAFE_NO_PAD
            .decode(mac_b64)
            .map_err(|_| IdentityError::InvalidSession)?;

        let expected_mac = self.hmac(&payload_bytes);
        if expected_mac.ct_eq(&mac_bytes).unwrap_u8() != 1 {
            return Err(IdentityError::InvalidSession);
        }

        let payload: SessionPayload =
            serde_json::from_slice(&payload_bytes).map_err(|_| IdentityError::InvalidSession)?;
        if Utc::now().timestamp() > payload.exp {
            return Err(IdentityError::InvalidSession);
        }

        Ok(payload.sub)
    }

    fn sign(&self, payload: &SessionPayload) -> Result<String> {
        let payload_bytes =
            serde_json::to_vec(payload).map_err(|e| IdentityError::Internal(e.into()))?;
        let mac = self.hmac(&payload_bytes);
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload_bytes),
            URL_SAFE_NO_PAD.encode(mac)
        ))
    }

    fn hmac(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    fn cookie_attrs(&self, value: &str, expires: Option<&str>) -> String {
        let mut cookie = format!("{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        match expires {
            Some(expires) => cookie.push_str(&format!("; Expires={expires}; Max-Age=-1")),
            None => {
                let max_age = self.lifespan.num_seconds();
                cookie.push_str(&format!("; Max-Age={max_age}"));
            }
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(b"a-32-byte-or-longer-test-secret".to_vec(), Duration::hours(1), false)
    }

    #[test]
    fn round_trips_a_valid_session() {
        let sm = manager();
        let user_id = Uuid::new_v4();
        let cookie = sm.set(user_id).unwrap();
        let value = cookie
            .split(';')
            .next()
            .unwrap()
            .strip_prefix("idsess=")
            .unwrap();
        assert_eq!(sm.verify(value).unwrap(), user_id);
    }

    #[test]
    fn rejects_a_tampered_signature() {
        let sm = manager();
        let cookie = sm.set(Uuid::new_v4()).unwrap();
        let value = cookie
            .split(';')
            .next()
            .unwrap()
            .strip_prefix("idsess=")
            .unwrap();
        let (payload, _mac) = value.split_once('.').unwrap();
        let tampered = format!("{payload}.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
        assert!(sm.verify(&tampered).is_err());
    }

    #[test]
    fn rejects_a_missing_separator() {
        assert!(manager().verify("not-a-valid-cookie").is_err());
    }

    #[test]
    fn rejects_an_expired_session() {
        let sm = SessionManager::new(b"a-32-byte-or-longer-test-secret".to_vec(), Duration::seconds(-1), false);
        let cookie = sm.set(Uuid::new_v4()).unwrap();
        let value = cookie
            .split(';')
            .next()
            .unwrap()
            .strip_prefix("idsess=")
            .unwrap();
        assert!(sm.verify(value).is_err());
    }
}
