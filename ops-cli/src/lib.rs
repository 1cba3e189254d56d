//! Shared argument parsing for `identityctl`, the identity service's operator CLI.

use std::env;

/// Database DSN and pool size, read from the environment the same way
/// `identity-server`'s own config layer does (§10.3), without pulling in
/// `config-engine`'s YAML layering for a one-shot admin tool.
pub struct DbArgs {
    pub database_url: String,
    pub max_connections: u32,
}

impl DbArgs {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

/// The HMAC key backing opaque grant tokens (C2) and DCR tokens (C11). Both
/// live in the environment under a name matching `identity-server`'s own
/// config field so an operator can source the same `.env` file for either.
pub fn token_secret(var: &str) -> anyhow::Result<Vec<u8>> {
    env::var(var)
        .map(String::into_bytes)
        .map_err(|_| anyhow::anyhow!("{var} must be set"))
}
