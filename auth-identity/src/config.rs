use serde::{Deserialize, Serialize};

/// Session/credential policy knobs; population and validation live in
/// `config-engine` (§10.3), this struct is the typed shape it deserializes into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub session_secret: String,
    pub session_lifespan_hours: i64,
    pub session_secure_cookies: bool,
    pub bcrypt_cost: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_secret: "change-me-in-production-32-bytes-min".to_string(),
            session_lifespan_hours: 12,
            session_secure_cookies: true,
            bcrypt_cost: 12,
        }
    }
}
