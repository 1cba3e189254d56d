//! Dynamic Client Registration (C11), §4.11. Registration is gated by an Initial
//! Access Token; each registered client gets its own Registration Access Token
//! that authorizes subsequent reads/updates/deletes of that one client.

use chrono::{Duration as ChronoDuration, Utc};
use crypto::TokenCodec;
use database_layer::models::ClientRow;
use database_layer::{ClientStore, DatabaseError, RegistrationTokenStore};

use crate::error::{OAuthError, Result};
use crate::models::{ClientMetadata, RegisterClientRequest, RegisterClientResponse};
use crate::registry::ClientRegistry;

fn rat_lifespan() -> ChronoDuration {
    ChronoDuration::days(7)
}

const DEFAULT_GRANT_TYPES: &[&str] = &["authorization_code"];
const DEFAULT_RESPONSE_TYPES: &[&str] = &["code"];

pub struct DcrService {
    registry: std::sync::Arc<ClientRegistry>,
    clients: ClientStore,
    tokens: RegistrationTokenStore,
    codec: TokenCodec,
    default_scope: String,
}

impl DcrService {
    pub fn new(
        registry: std::sync::Arc<ClientRegistry>,
        clients: ClientStore,
        tokens: RegistrationTokenStore,
        codec: TokenCodec,
        default_scope: String,
    ) -> Self {
        Self {
            registry,
            clients,
            tokens,
            codec,
            default_scope,
        }
    }

    /// `POST /register`. `initial_access_token` is the bearer value presented on
    /// the request, already stripped of the `Bearer ` prefix by the HTTP layer.
    pub async fn register(
        &self,
        initial_access_token: &str,
        request: &RegisterClientRequest,
    ) -> Result<RegisterClientResponse> {
        let iat_hash = self.codec.hash(initial_access_token);
        self.tokens
            .find_active_iat(&iat_hash)
            .await
            .map_err(|_| OAuthError::AccessDenied)?;

        if request.redirect_uris.is_empty() {
            return Err(OAuthError::InvalidRequest(
                "redirect_uris must contain at least one URI".to_string(),
            ));
        }

        let auth_method = request
            .token_endpoint_auth_method
            .clone()
            .unwrap_or_else(|| "none".to_string());
        let public = auth_method == "none";

        let (client_secret, hashed_secret) = if public {
            (None, None)
        } else {
            let (handle, _) = self.codec.mint();
            let hashed = bcrypt::hash(&handle, bcrypt::DEFAULT_COST)
                .map_err(|e| OAuthError::Internal(e.into()))?;
            (Some(handle), Some(hashed))
        };

        let client_id = uuid::Uuid::new_v4().to_string();
        let grant_types = request
            .grant_types
            .clone()
            .unwrap_or_else(|| DEFAULT_GRANT_TYPES.iter().map(|s| s.to_string()).collect());
        let response_types = request
            .response_types
            .clone()
            .unwrap_or_else(|| DEFAULT_RESPONSE_TYPES.iter().map(|s| s.to_string()).collect());
        let scope = request.scope.clone().unwrap_or_else(|| self.default_scope.clone());

        let row = ClientRow {
            client_id: client_id.clone(),
            hashed_secret,
            redirect_uris: request.redirect_uris.clone(),
            grant_types: grant_types.clone(),
            response_types: response_types.clone(),
            scopes: scope.split_whitespace().map(str::to_string).collect(),
            audiences: vec![],
            public,
            token_endpoint_auth_method: auth_method.clone(),
            internal: false,
            display_name: request.client_name.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.clients.upsert(&row).await?;
        self.registry.reload(&client_id).await?;

        let (rat_handle, rat_hash) = self.codec.mint();
        let rat_expires_at = Utc::now() + rat_lifespan();
        self.tokens
            .create_rat(&rat_hash, &client_id, rat_expires_at)
            .await?;

        Ok(RegisterClientResponse {
            client_id: client_id.clone(),
            client_secret,
            client_secret_expires_at: 0,
            registration_access_token: rat_handle,
            registration_client_uri: format!("/register/{client_id}"),
            client_name: row.display_name,
            redirect_uris: row.redirect_uris,
            token_endpoint_auth_method: auth_method,
            grant_types,
            response_types,
        })
    }

    pub async fn get(&self, client_id: &str, rat: &str) -> Result<ClientMetadata> {
        self.authorize_rat(client_id, rat).await?;
        let row = self.clients.get(client_id).await?;
        Ok(to_metadata(row))
    }

    pub async fn update(
        &self,
        client_id: &str,
        rat: &str,
        request: &RegisterClientRequest,
    ) -> Result<ClientMetadata> {
        self.authorize_rat(client_id, rat).await?;
        let mut row = self.clients.get(client_id).await?;

        if request.redirect_uris.is_empty() {
            return Err(OAuthError::InvalidRequest(
                "redirect_uris must contain at least one URI".to_string(),
            ));
        }
        row.redirect_uris = request.redirect_uris.clone();
        if let Some(name) = &request.client_name {
            row.display_name = Some(name.clone());
        }
        if let Some(grant_types) = &request.grant_types {
            row.grant_types = grant_types.clone();
        }
        if let Some(response_types) = &request.response_types {
            row.response_types = response_types.clone();
        }
        if let Some(scope) = &request.scope {
            row.scopes = scope.split_whitespace().map(str::to_string).collect();
        }

        self.clients.upsert(&row).await?;
        self.registry.reload(client_id).await?;
        Ok(to_metadata(row))
    }

    pub async fn delete(&self, client_id: &str, rat: &str) -> Result<()> {
        self.authorize_rat(client_id, rat).await?;
        self.registry.delete(client_id).await?;
        self.tokens.revoke_rat_for_client(client_id).await?;
        Ok(())
    }

    async fn authorize_rat(&self, client_id: &str, rat: &str) -> Result<()> {
        let rat_hash = self.codec.hash(rat);
        let row = self
            .tokens
            .find_active_rat(&rat_hash)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound => OAuthError::AccessDenied,
                other => other.into(),
            })?;
        if row.client_id != client_id {
            return Err(OAuthError::AccessDenied);
        }
        Ok(())
    }
}

fn to_metadata(row: ClientRow) -> ClientMetadata {
    ClientMetadata {
        client_id: row.client_id,
        client_name: row.display_name,
        redirect_uris: row.redirect_uris,
        token_endpoint_auth_method: row.token_endpoint_auth_method,
        grant_types: row.grant_types,
        response_types: row.response_types,
        scope: row.scopes.join(" "),
    }
}
