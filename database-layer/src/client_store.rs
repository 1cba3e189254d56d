//! Persistence for `oauth2_clients`, consulted by the Client Registry (C3) on
//! cache miss and written exclusively by the DCR Controller (C11).

use crate::connection::{with_retry, DbPool};
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::ClientRow;

#[derive(Clone)]
pub struct ClientStore {
    pool: DbPool,
}

impl ClientStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, client_id: &str) -> DatabaseResult<ClientRow> {
        sqlx::query_as::<_, ClientRow>(
            "SELECT client_id, hashed_secret, redirect_uris, grant_types, response_types, \
                    scopes, audiences, public, token_endpoint_auth_method, internal, \
                    display_name, created_at, updated_at \
             FROM oauth2_clients WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn list(&self) -> DatabaseResult<Vec<ClientRow>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            "SELECT client_id, hashed_secret, redirect_uris, grant_types, response_types, \
                    scopes, audiences, public, token_endpoint_auth_method, internal, \
                    display_name, created_at, updated_at \
             FROM oauth2_clients",
        )
        .fetch_all(self.pool.pool())
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(&self, client: &ClientRow) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query(
                "INSERT INTO oauth2_clients \
                 (client_id, hashed_secret, redirect_uris, grant_types, response_types, scopes, \
                  audiences, public, token_endpoint_auth_method, internal, display_name, \
                  created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now(), now()) \
                 ON CONFLICT (client_id) DO UPDATE SET \
                   hashed_secret = EXCLUDED.hashed_secret, \
                   redirect_uris = EXCLUDED.redirect_uris, \
                   grant_types = EXCLUDED.grant_types, \
                   response_types = EXCLUDED.response_types, \
                   scopes = EXCLUDED.scopes, \
                   audiences = EXCLUDED.audiences, \
                   public = EXCLUDED.public, \
                   token_endpoint_auth_method = EXCLUDED.token_endpoint_auth_method, \
                   internal = EXCLUDED.internal, \
                   display_name = EXCLUDED.display_name, \
                   updated_at = now()",
            )
            .bind(&client.client_id)
            .bind(&client.hashed_secret)
            .bind(&client.redirect_uris)
            .bind(&client.grant_types)
            .bind(&client.response_types)
            .bind(&client.scopes)
            .bind(&client.audiences)
            .bind(client.public)
            .bind(&client.token_endpoint_auth_method)
            .bind(client.internal)
            .bind(&client.display_name)
            .execute(self.pool.pool())
            .await?;
            Ok(())
        })
        .await
    }

    pub async fn delete(&self, client_id: &str) -> DatabaseResult<()> {
        with_retry(|| async {
            sqlx::query("DELETE FROM oauth2_clients WHERE client_id = $1")
                .bind(client_id)
                .execute(self.pool.pool())
                .await?;
            Ok(())
        })
        .await
    }
}
