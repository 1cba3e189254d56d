//! Persistence for `users` and `credentials` (§3), plus the tenant-membership
//! seam the login controller reads but this crate does not own (§1: tenant
//! CRUD is an external repository interface).

use async_trait::async_trait;
use database_layer::{with_retry, DbPool};
use uuid::Uuid;

use crate::error::{IdentityError, Result};
use crate::models::{Credential, TenantMembership, User, CREDENTIAL_TYPE_PASSWORD};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn touch_last_login(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_password_credential(&self, user_id: Uuid) -> Result<Option<Credential>>;
    async fn create_password_credential(
        &self,
        user_id: Uuid,
        identifier: &str,
        secret_hash: &str,
    ) -> Result<()>;
    async fn update_secret_hash(&self, credential_id: Uuid, secret_hash: &str) -> Result<()>;
    async fn touch_last_used(&self, credential_id: Uuid) -> Result<()>;
}

/// Out of scope per §1; a deployment that models tenants provides its own
/// implementation. The default used when none is wired returns `None`, which
/// the login response surfaces as "tenants omitted" rather than "zero tenants".
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn memberships_for_user(&self, user_id: Uuid) -> Result<Option<Vec<TenantMembership>>>;
}

pub struct NullTenantRepository;

#[async_trait]
impl TenantRepository for NullTenantRepository {
    async fn memberships_for_user(&self, _user_id: Uuid) -> Result<Option<Vec<TenantMembership>>> {
        Ok(None)
    }
}

pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, name, picture, email_verified, last_login_at, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| IdentityError::Database(e.into()))?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, name, picture, email_verified, last_login_at, created_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| IdentityError::Database(e.into()))?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, name, picture, email_verified, last_login_at, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| IdentityError::Database(e.into()))?;
        Ok(user)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<()> {
        with_retry(|| async {
            sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
                .bind(id)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
        .map_err(IdentityError::Database)
    }
}

pub struct PgCredentialRepository {
    pool: DbPool,
}

impl PgCredentialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn find_password_credential(&self, user_id: Uuid) -> Result<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id, user_id, credential_type, identifier, secret_hash, last_used_at \
             FROM credentials WHERE user_id = $1 AND credential_type = $2",
        )
        .bind(user_id)
        .bind(CREDENTIAL_TYPE_PASSWORD)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| IdentityError::Database(e.into()))?;
        Ok(credential)
    }

    async fn create_password_credential(
        &self,
        user_id: Uuid,
        identifier: &str,
        secret_hash: &str,
    ) -> Result<()> {
        with_retry(|| async {
            sqlx::query(
                "INSERT INTO credentials (id, user_id, credential_type, identifier, secret_hash) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(CREDENTIAL_TYPE_PASSWORD)
            .bind(identifier)
            .bind(secret_hash)
            .execute(self.pool.pool())
            .await?;
            Ok(())
        })
        .await
        .map_err(IdentityError::Database)
    }

    async fn update_secret_hash(&self, credential_id: Uuid, secret_hash: &str) -> Result<()> {
        with_retry(|| async {
            sqlx::query("UPDATE credentials SET secret_hash = $1 WHERE id = $2")
                .bind(secret_hash)
                .bind(credential_id)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
        .map_err(IdentityError::Database)
    }

    async fn touch_last_used(&self, credential_id: Uuid) -> Result<()> {
        with_retry(|| async {
            sqlx::query("UPDATE credentials SET last_used_at = now() WHERE id = $1")
                .bind(credential_id)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
        .map_err(IdentityError::Database)
    }
}
