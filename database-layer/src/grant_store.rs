//! The Grant Store (C4): authorization codes, access tokens, refresh tokens, PKCE
//! records, and OIDC sessions, with one-shot redemption and lineage semantics.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use uuid::Uuid;

use crate::connection::{with_retry, DbPool};
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{GrantRow, NewGrant, OidcSessionRow, PkceRow};

#[derive(Clone)]
pub struct GrantStore {
    pool: DbPool,
}

impl GrantStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // -- Authorization codes --------------------------------------------------

    pub async fn put_authz_code(&self, grant: &NewGrant) -> DatabaseResult<()> {
        self.insert_grant("oauth2_authorization_codes", grant, None)
            .await
    }

    /// Atomic one-shot redemption: the first caller to flip `active` wins, every
    /// other concurrent or later caller observes `NotFound`.
    pub async fn redeem_authz_code(&self, signature: &str) -> DatabaseResult<GrantRow> {
        with_retry(|| async {
            sqlx::query_as::<_, GrantRow>(
                "UPDATE oauth2_authorization_codes \
                 SET active = false \
                 WHERE signature = $1 AND active \
                 RETURNING signature, request_id, requested_at, client_id, requested_scopes, \
                           granted_scopes, requested_audience, granted_audience, subject, form, \
                           active, expires_at",
            )
            .bind(signature)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    // -- Access tokens ----------------------------------------------------------

    pub async fn put_access_token(
        &self,
        grant: &NewGrant,
        lifespan: std::time::Duration,
    ) -> DatabaseResult<()> {
        let expires_at = Utc::now() + ChronoDuration::from_std(lifespan).unwrap_or_default();
        self.insert_grant("oauth2_access_tokens", grant, Some(expires_at))
            .await
    }

    pub async fn get_access_token(&self, signature: &str) -> DatabaseResult<GrantRow> {
        sqlx::query_as::<_, GrantRow>(
            "SELECT signature, request_id, requested_at, client_id, requested_scopes, \
                    granted_scopes, requested_audience, granted_audience, subject, form, \
                    active, expires_at \
             FROM oauth2_access_tokens \
             WHERE signature = $1 AND active AND expires_at > now()",
        )
        .bind(signature)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn delete_access_token(&self, signature: &str) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query("UPDATE oauth2_access_tokens SET active = false WHERE signature = $1")
                .bind(signature)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
    }

    // -- Refresh tokens -----------------------------------------------------

    pub async fn put_refresh_token(&self, grant: &NewGrant) -> DatabaseResult<()> {
        self.insert_grant("oauth2_refresh_tokens", grant, None)
            .await
    }

    pub async fn get_refresh_token(&self, signature: &str) -> DatabaseResult<GrantRow> {
        sqlx::query_as::<_, GrantRow>(
            "SELECT signature, request_id, requested_at, client_id, requested_scopes, \
                    granted_scopes, requested_audience, granted_audience, subject, form, \
                    active, expires_at \
             FROM oauth2_refresh_tokens \
             WHERE signature = $1 AND active",
        )
        .bind(signature)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Looks a refresh token signature up regardless of `active`, so a caller can
    /// tell "never existed" (invalid_grant) apart from "existed, already rotated
    /// away" (reuse, triggering [`Self::revoke_lineage`]).
    pub async fn get_refresh_token_any(&self, signature: &str) -> DatabaseResult<GrantRow> {
        sqlx::query_as::<_, GrantRow>(
            "SELECT signature, request_id, requested_at, client_id, requested_scopes, \
                    granted_scopes, requested_audience, granted_audience, subject, form, \
                    active, expires_at \
             FROM oauth2_refresh_tokens \
             WHERE signature = $1",
        )
        .bind(signature)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Soft-deactivates every refresh token sharing `request_id`. Callers insert the
    /// replacement row immediately after this returns; the two steps serialize
    /// per lineage.
    pub async fn rotate_refresh_token_by_lineage(&self, request_id: Uuid) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query(
                "UPDATE oauth2_refresh_tokens SET active = false WHERE request_id = $1 AND active",
            )
            .bind(request_id)
            .execute(self.pool.pool())
            .await?;
            Ok(())
        })
        .await
    }

    /// Soft-deactivates every access and refresh token in the lineage. Used on
    /// refresh-token reuse detection and explicit revocation.
    pub async fn revoke_lineage(&self, request_id: Uuid) -> DatabaseResult<()> {
        with_retry(|| async {
            let mut tx = self.pool.pool().begin().await?;
            sqlx::query(
                "UPDATE oauth2_access_tokens SET active = false WHERE request_id = $1 AND active",
            )
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "UPDATE oauth2_refresh_tokens SET active = false WHERE request_id = $1 AND active",
            )
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    // -- PKCE -----------------------------------------------------------------

    pub async fn put_pkce(
        &self,
        signature: &str,
        code_challenge: &str,
        code_challenge_method: &str,
    ) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query(
                "INSERT INTO oauth2_pkce (signature, code_challenge, code_challenge_method) \
                 VALUES ($1, $2, $3)",
            )
            .bind(signature)
            .bind(code_challenge)
            .bind(code_challenge_method)
            .execute(self.pool.pool())
            .await?;
            Ok(())
        })
        .await
    }

    pub async fn get_pkce(&self, signature: &str) -> DatabaseResult<PkceRow> {
        sqlx::query_as::<_, PkceRow>(
            "SELECT signature, code_challenge, code_challenge_method FROM oauth2_pkce \
             WHERE signature = $1",
        )
        .bind(signature)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn delete_pkce(&self, signature: &str) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query("DELETE FROM oauth2_pkce WHERE signature = $1")
                .bind(signature)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
    }

    // -- OIDC sessions --------------------------------------------------------

    pub async fn put_oidc_session(
        &self,
        signature: &str,
        request_id: Uuid,
        claims: &serde_json::Value,
    ) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query(
                "INSERT INTO oauth2_oidc_sessions (signature, request_id, claims) \
                 VALUES ($1, $2, $3)",
            )
            .bind(signature)
            .bind(request_id)
            .bind(claims)
            .execute(self.pool.pool())
            .await?;
            Ok(())
        })
        .await
    }

    pub async fn get_oidc_session(&self, signature: &str) -> DatabaseResult<OidcSessionRow> {
        sqlx::query_as::<_, OidcSessionRow>(
            "SELECT signature, request_id, claims FROM oauth2_oidc_sessions WHERE signature = $1",
        )
        .bind(signature)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn delete_oidc_session(&self, signature: &str) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query("DELETE FROM oauth2_oidc_sessions WHERE signature = $1")
                .bind(signature)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
    }

    async fn insert_grant(
        &self,
        table: &'static str,
        grant: &NewGrant,
        expires_at: Option<DateTime<Utc>>,
    ) -> DatabaseResult<()> {
        let sql = format!(
            "INSERT INTO {table} \
             (signature, request_id, requested_at, client_id, requested_scopes, granted_scopes, \
              requested_audience, granted_audience, subject, form, active, expires_at) \
             VALUES ($1, $2, now(), $3, $4, $5, $6, $7, $8, $9, true, $10)"
        );
        with_retry(|| async {
            sqlx::query(&sql)
                .bind(&grant.signature)
                .bind(grant.request_id)
                .bind(&grant.client_id)
                .bind(&grant.requested_scopes)
                .bind(&grant.granted_scopes)
                .bind(&grant.requested_audience)
                .bind(&grant.granted_audience)
                .bind(&grant.subject)
                .bind(&grant.form)
                .bind(expires_at)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
    }
}
