use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `users` (§3 "external repository interface" for user CRUD; this crate only
/// reads/updates the fields the login and session paths need).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// `credentials`, one row per `(user_id, credential_type, identifier)`. Only the
/// `password` type is issued/verified by this crate; the schema accommodates
/// others (e.g. WebAuthn) without this crate specifying their flows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Credential {
    pub id: Uuid,
    pub user_id: Uuid,
    pub credential_type: String,
    pub identifier: String,
    pub secret_hash: String,
    pub last_used_at: Option<DateTime<Utc>>,
}

pub const CREDENTIAL_TYPE_PASSWORD: &str = "password";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A membership row from the (out-of-scope) tenant repository; `None` from
/// [`crate::repository::TenantRepository`] means the deployment doesn't model
/// tenants at all, as opposed to `Some(vec![])` meaning zero memberships.
#[derive(Debug, Clone, Serialize)]
pub struct TenantMembership {
    pub tenant_id: String,
    pub tenant_name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenants: Option<Vec<TenantMembership>>,
}
