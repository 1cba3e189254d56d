//! Row shapes for the grant store (C4) and the client table it sits beside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `oauth2_clients`. Invariant enforced by callers (C11/C3), not by this row type:
/// `public == true` iff `hashed_secret` is `None` and `token_endpoint_auth_method == "none"`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClientRow {
    pub client_id: String,
    pub hashed_secret: Option<String>,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub scopes: Vec<String>,
    pub audiences: Vec<String>,
    pub public: bool,
    pub token_endpoint_auth_method: String,
    pub internal: bool,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters shared by every grant-artifact insert (authorization code, access
/// token, refresh token). `form` is opaque JSON, per the "self-describing column,
/// not language-specific binary" design note.
#[derive(Debug, Clone)]
pub struct NewGrant {
    pub signature: String,
    pub request_id: Uuid,
    pub client_id: String,
    pub requested_scopes: Vec<String>,
    pub granted_scopes: Vec<String>,
    pub requested_audience: Vec<String>,
    pub granted_audience: Vec<String>,
    pub subject: String,
    pub form: serde_json::Value,
}

/// A row read back from any grant table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GrantRow {
    pub signature: String,
    pub request_id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub client_id: String,
    pub requested_scopes: Vec<String>,
    pub granted_scopes: Vec<String>,
    pub requested_audience: Vec<String>,
    pub granted_audience: Vec<String>,
    pub subject: String,
    pub form: serde_json::Value,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// `oauth2_pkce`, bound one-to-one to an authorization code's signature.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PkceRow {
    pub signature: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
}

/// `oauth2_oidc_sessions`: the claims minted at `/oauth2/authorize` time, consumed
/// when the code is redeemed for an ID token.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OidcSessionRow {
    pub signature: String,
    pub request_id: Uuid,
    pub claims: serde_json::Value,
}

/// `oauth2_initial_access_tokens`. Consumed zero-or-more times until revoked/expired.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InitialAccessTokenRow {
    pub id: Uuid,
    pub token_hash: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `oauth2_registration_access_tokens`. One per DCR registration.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RegistrationAccessTokenRow {
    pub token_hash: String,
    pub client_id: String,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
}
