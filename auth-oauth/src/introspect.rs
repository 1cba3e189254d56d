//! Introspection and revocation (C9). Both endpoints try the access-token table
//! first, then the refresh-token table, matching the spec's "token is opaque, the
//! caller doesn't say which kind" framing.

use crypto::TokenCodec;
use database_layer::GrantStore;

use crate::error::Result;
use crate::models::IntrospectionResponse;

pub struct IntrospectionService {
    grants: GrantStore,
    codec: TokenCodec,
    issuer: String,
}

impl IntrospectionService {
    pub fn new(grants: GrantStore, codec: TokenCodec, issuer: String) -> Self {
        Self {
            grants,
            codec,
            issuer,
        }
    }

    /// §4.9: never errors on an unknown/expired/revoked token, only on client
    /// authentication failure upstream (handled by the caller before this runs).
    pub async fn introspect(&self, token: &str) -> IntrospectionResponse {
        let signature = self.codec.hash(token);

        if let Ok(row) = self.grants.get_access_token(&signature).await {
            return IntrospectionResponse {
                active: true,
                scope: Some(row.granted_scopes.join(" ")),
                client_id: Some(row.client_id),
                sub: Some(row.subject),
                aud: Some(row.granted_audience),
                iss: Some(self.issuer.clone()),
                exp: row.expires_at.map(|t| t.timestamp()),
                iat: Some(row.requested_at.timestamp()),
                token_type: Some("access_token".to_string()),
            };
        }

        if let Ok(row) = self.grants.get_refresh_token(&signature).await {
            return IntrospectionResponse {
                active: true,
                scope: Some(row.granted_scopes.join(" ")),
                client_id: Some(row.client_id),
                sub: Some(row.subject),
                aud: Some(row.granted_audience),
                iss: Some(self.issuer.clone()),
                exp: None,
                iat: Some(row.requested_at.timestamp()),
                token_type: Some("refresh_token".to_string()),
            };
        }

        IntrospectionResponse::inactive()
    }

    /// §4.10: revocation is idempotent. A token that is already gone, never
    /// existed, or belongs to a different kind still returns success to the
    /// caller; only storage failures propagate.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        let signature = self.codec.hash(token);

        self.grants.delete_access_token(&signature).await?;

        if let Ok(row) = self.grants.get_refresh_token_any(&signature).await {
            self.grants.revoke_lineage(row.request_id).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_response_omits_every_optional_field() {
        let response = IntrospectionResponse::inactive();
        assert!(!response.active);
        assert!(response.scope.is_none());
        assert!(response.client_id.is_none());
    }
}
