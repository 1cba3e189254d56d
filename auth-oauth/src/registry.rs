//! Client Registry (C3): an in-memory cache over the persistent client table.

use std::collections::HashMap;
use std::sync::Arc;

use database_layer::{ClientStore, DatabaseError};
use parking_lot::RwLock;
use tracing::warn;

use crate::error::{OAuthError, Result};
use database_layer::models::ClientRow;

pub struct ClientRegistry {
    store: ClientStore,
    cache: Arc<RwLock<HashMap<String, ClientRow>>>,
}

impl ClientRegistry {
    pub fn new(store: ClientStore) -> Self {
        Self {
            store,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Hydrates the cache from storage. Called once at startup.
    pub async fn hydrate(&self) -> Result<()> {
        let rows = self.store.list().await?;
        let mut cache = self.cache.write();
        cache.clear();
        for row in rows {
            cache.insert(row.client_id.clone(), row);
        }
        Ok(())
    }

    /// Cache-miss on `get` triggers a single reload attempt before reporting
    /// not-found, per §4.3.
    pub async fn get(&self, client_id: &str) -> Result<ClientRow> {
        if let Some(client) = self.cache.read().get(client_id).cloned() {
            return Ok(client);
        }
        match self.reload(client_id).await {
            Ok(()) => self
                .cache
                .read()
                .get(client_id)
                .cloned()
                .ok_or(OAuthError::InvalidClient),
            Err(OAuthError::InvalidClient) => Err(OAuthError::InvalidClient),
            Err(other) => Err(other),
        }
    }

    /// Write-through: persist first (by the caller, e.g. C11), then replace the
    /// cache entry atomically here. Readers may briefly observe a stale entry but
    /// never a partially applied one.
    pub async fn reload(&self, client_id: &str) -> Result<()> {
        match self.store.get(client_id).await {
            Ok(row) => {
                self.cache.write().insert(client_id.to_string(), row);
                Ok(())
            }
            Err(DatabaseError::NotFound) => {
                self.cache.write().remove(client_id);
                Err(OAuthError::InvalidClient)
            }
            Err(e) => {
                warn!(error = %e, client_id, "client reload failed");
                Err(e.into())
            }
        }
    }

    pub async fn delete(&self, client_id: &str) -> Result<()> {
        self.store.delete(client_id).await?;
        self.cache.write().remove(client_id);
        Ok(())
    }

    /// Public clients authenticate trivially; confidential clients must present
    /// the correct secret, compared via bcrypt's constant-time verify.
    pub async fn authenticate(&self, client_id: &str, secret: Option<&str>) -> Result<ClientRow> {
        let client = self.get(client_id).await?;
        if client.public {
            return Ok(client);
        }
        let (Some(secret), Some(hash)) = (secret, client.hashed_secret.as_deref()) else {
            return Err(OAuthError::InvalidClient);
        };
        let matches = bcrypt::verify(secret, hash).map_err(|e| OAuthError::Internal(e.into()))?;
        if matches {
            Ok(client)
        } else {
            Err(OAuthError::InvalidClient)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client(id: &str, public: bool) -> ClientRow {
        ClientRow {
            client_id: id.to_string(),
            hashed_secret: if public {
                None
            } else {
                Some(bcrypt::hash("s3cr3t!", 4).unwrap())
            },
            redirect_uris: vec!["http://localhost/cb".to_string()],
            grant_types: vec!["authorization_code".to_string()],
            response_types: vec!["code".to_string()],
            scopes: vec!["openid".to_string()],
            audiences: vec![],
            public,
            token_endpoint_auth_method: if public { "none" } else { "basic" }.to_string(),
            internal: false,
            display_name: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn public_client_authenticates_without_secret() {
        let cache = Arc::new(RwLock::new(HashMap::new()));
        cache
            .write()
            .insert("spa".to_string(), sample_client("spa", true));
        assert!(cache.read().get("spa").unwrap().public);
    }

    #[test]
    fn confidential_client_rejects_wrong_secret() {
        let client = sample_client("admin-cli", false);
        let hash = client.hashed_secret.unwrap();
        assert!(bcrypt::verify("s3cr3t!", &hash).unwrap());
        assert!(!bcrypt::verify("wrong", &hash).unwrap());
    }
}
