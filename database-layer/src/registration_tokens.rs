//! Persistence for Initial Access Tokens and Registration Access Tokens (C11).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::connection::{with_retry, DbPool};
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{InitialAccessTokenRow, RegistrationAccessTokenRow};

#[derive(Clone)]
pub struct RegistrationTokenStore {
    pool: DbPool,
}

impl RegistrationTokenStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // -- Initial Access Tokens ------------------------------------------------

    pub async fn create_iat(
        &self,
        token_hash: &str,
        expires_at: Option<DateTime<Utc>>,
        description: Option<&str>,
    ) -> DatabaseResult<Uuid> {
        with_retry(|| async {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO oauth2_initial_access_tokens \
                 (id, token_hash, expires_at, active, description, created_at) \
                 VALUES ($1, $2, $3, true, $4, now())",
            )
            .bind(id)
            .bind(token_hash)
            .bind(expires_at)
            .bind(description)
            .execute(self.pool.pool())
            .await?;
            Ok(id)
        })
        .await
    }

    /// Active-and-unexpired lookup; does not consume the token (IATs may be used
    /// zero or more times until revoked/expired).
    pub async fn find_active_iat(&self, token_hash: &str) -> DatabaseResult<InitialAccessTokenRow> {
        sqlx::query_as::<_, InitialAccessTokenRow>(
            "SELECT id, token_hash, expires_at, active, description, created_at \
             FROM oauth2_initial_access_tokens \
             WHERE token_hash = $1 AND active AND (expires_at IS NULL OR expires_at > now())",
        )
        .bind(token_hash)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn revoke_iat(&self, id: Uuid) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query("UPDATE oauth2_initial_access_tokens SET active = false WHERE id = $1")
                .bind(id)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
    }

    // -- Registration Access Tokens -------------------------------------------

    pub async fn create_rat(
        &self,
        token_hash: &str,
        client_id: &str,
        expires_at: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query(
                "INSERT INTO oauth2_registration_access_tokens \
                 (token_hash, client_id, expires_at, active) VALUES ($1, $2, $3, true)",
            )
            .bind(token_hash)
            .bind(client_id)
            .bind(expires_at)
            .execute(self.pool.pool())
            .await?;
            Ok(())
        })
        .await
    }

    pub async fn find_active_rat(
        &self,
        token_hash: &str,
    ) -> DatabaseResult<RegistrationAccessTokenRow> {
        sqlx::query_as::<_, RegistrationAccessTokenRow>(
            "SELECT token_hash, client_id, expires_at, active \
             FROM oauth2_registration_access_tokens \
             WHERE token_hash = $1 AND active AND expires_at > now()",
        )
        .bind(token_hash)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn revoke_rat_for_client(&self, client_id: &str) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query(
                "UPDATE oauth2_registration_access_tokens SET active = false WHERE client_id = $1",
            )
            .bind(client_id)
            .execute(self.pool.pool())
            .await?;
            Ok(())
        })
        .await
    }
}
