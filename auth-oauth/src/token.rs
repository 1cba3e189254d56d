//! Token Endpoint (C8): dispatches by `grant_type`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crypto::{SigningMaterial, TokenCodec};
use database_layer::models::NewGrant;
use database_layer::{DatabaseError, GrantStore};

use crate::error::{OAuthError, Result};
use crate::models::{OidcSessionClaims, TokenRequest, TokenResponse};
use crate::pkce;
use crate::registry::ClientRegistry;
use crate::scopes;

pub struct Lifespans {
    pub access_token: Duration,
    pub refresh_token: Duration,
    pub authorize_code: Duration,
    pub id_token: Duration,
}

pub struct TokenService {
    registry: Arc<ClientRegistry>,
    grants: GrantStore,
    codec: Arc<TokenCodec>,
    signer: Arc<SigningMaterial>,
    lifespans: Lifespans,
}

impl TokenService {
    pub fn new(
        registry: Arc<ClientRegistry>,
        grants: GrantStore,
        codec: Arc<TokenCodec>,
        signer: Arc<SigningMaterial>,
        lifespans: Lifespans,
    ) -> Self {
        Self {
            registry,
            grants,
            codec,
            signer,
            lifespans,
        }
    }

    pub async fn dispatch(&self, request: &TokenRequest) -> Result<TokenResponse> {
        match request.grant_type.as_str() {
            "authorization_code" => self.authorization_code(request).await,
            "refresh_token" => self.refresh_token(request).await,
            "client_credentials" => self.client_credentials(request).await,
            _ => Err(OAuthError::UnsupportedGrantType),
        }
    }

    async fn authenticate_client(
        &self,
        request: &TokenRequest,
    ) -> Result<database_layer::models::ClientRow> {
        let client_id = request
            .client_id
            .as_deref()
            .ok_or_else(|| OAuthError::InvalidRequest("client_id is required".to_string()))?;
        self.registry
            .authenticate(client_id, request.client_secret.as_deref())
            .await
    }

    async fn authorization_code(&self, request: &TokenRequest) -> Result<TokenResponse> {
        let client = self.authenticate_client(request).await?;
        let code = request
            .code
            .as_deref()
            .ok_or_else(|| OAuthError::InvalidRequest("code is required".to_string()))?;
        let signature = self.codec.hash(code);

        let redeemed = self
            .grants
            .redeem_authz_code(&signature)
            .await
            .map_err(|e| map_not_found(e, OAuthError::InvalidGrant))?;

        if redeemed.client_id != client.client_id {
            return Err(OAuthError::InvalidGrant);
        }
        if redeemed.requested_at + self.chrono_lifespan(self.lifespans.authorize_code) < Utc::now()
        {
            return Err(OAuthError::InvalidGrant);
        }

        let form = &redeemed.form;
        let bound_redirect = form.get("redirect_uri").and_then(|v| v.as_str());
        if bound_redirect != request.redirect_uri.as_deref() {
            return Err(OAuthError::InvalidGrant);
        }

        if let Ok(pkce_row) = self.grants.get_pkce(&signature).await {
            let verifier = request
                .code_verifier
                .as_deref()
                .ok_or(OAuthError::InvalidGrant)?;
            if pkce_row.code_challenge_method != pkce::METHOD_S256
                || !pkce::verify(verifier, &pkce_row.code_challenge)
            {
                return Err(OAuthError::InvalidGrant);
            }
            self.grants.delete_pkce(&signature).await?;
        } else if client.public {
            // a public client with no PKCE record bound is a configuration error at
            // authorize time; redeeming it here would bypass C7's PKCE requirement.
            return Err(OAuthError::InvalidGrant);
        }

        let session = self
            .grants
            .get_oidc_session(&signature)
            .await
            .map_err(|e| map_not_found(e, OAuthError::InvalidGrant))?;
        let claims: OidcSessionClaims = serde_json::from_value(session.claims.clone())
            .map_err(|e| OAuthError::Internal(e.into()))?;

        let (access_handle, access_hash) = self.codec.mint();
        let access_grant = NewGrant {
            signature: access_hash,
            request_id: redeemed.request_id,
            client_id: client.client_id.clone(),
            requested_scopes: redeemed.requested_scopes.clone(),
            granted_scopes: redeemed.granted_scopes.clone(),
            requested_audience: redeemed.requested_audience.clone(),
            granted_audience: redeemed.granted_audience.clone(),
            subject: redeemed.subject.clone(),
            form: redeemed.form.clone(),
        };
        self.grants
            .put_access_token(&access_grant, self.lifespans.access_token)
            .await?;

        let refresh_handle = if scopes::contains(&redeemed.granted_scopes, "offline_access") {
            let (refresh_handle, refresh_hash) = self.codec.mint();
            let refresh_grant = NewGrant {
                signature: refresh_hash,
                ..clone_grant(&access_grant)
            };
            self.grants.put_refresh_token(&refresh_grant).await?;
            Some(refresh_handle)
        } else {
            None
        };

        let id_token = if scopes::contains(&redeemed.granted_scopes, "openid") {
            let mut id_claims = serde_json::to_value(&claims).map_err(|e| OAuthError::Internal(e.into()))?;
            let now = Utc::now().timestamp();
            if let Some(obj) = id_claims.as_object_mut() {
                obj.insert("iat".to_string(), serde_json::json!(now));
                obj.insert(
                    "exp".to_string(),
                    serde_json::json!(now + self.lifespans.id_token.as_secs() as i64),
                );
            }
            Some(self.signer.sign_id_token(&id_claims)?)
        } else {
            None
        };

        self.grants.delete_oidc_session(&signature).await.ok();

        Ok(TokenResponse {
            access_token: access_handle,
            token_type: "Bearer".to_string(),
            expires_in: self.lifespans.access_token.as_secs() as i64,
            refresh_token: refresh_handle,
            id_token,
            scope: scopes::join(&redeemed.granted_scopes),
        })
    }

    async fn refresh_token(&self, request: &TokenRequest) -> Result<TokenResponse> {
        let client = self.authenticate_client(request).await?;
        let token = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| OAuthError::InvalidRequest("refresh_token is required".to_string()))?;
        let signature = self.codec.hash(token);

        let stored = match self.grants.get_refresh_token(&signature).await {
            Ok(row) => row,
            Err(DatabaseError::NotFound) => {
                // The active lookup misses both for a garbage token and for one that
                // was already rotated away. Re-check ignoring `active` to tell reuse
                // apart from invalid, since reuse demands revoking the whole lineage.
                if let Ok(inactive) = self.grants.get_refresh_token_any(&signature).await {
                    self.grants.revoke_lineage(inactive.request_id).await?;
                }
                return Err(OAuthError::InvalidGrant);
            }
            Err(e) => return Err(e.into()),
        };

        if stored.client_id != client.client_id {
            return Err(OAuthError::InvalidGrant);
        }

        let new_requested_scopes = match &request.scope {
            Some(scope) => {
                let requested = scopes::parse(Some(scope));
                if !scopes::is_subset(&requested, &stored.granted_scopes) {
                    return Err(OAuthError::InvalidScope);
                }
                requested
            }
            None => stored.granted_scopes.clone(),
        };

        self.grants
            .rotate_refresh_token_by_lineage(stored.request_id)
            .await?;

        let (new_refresh_handle, new_refresh_hash) = self.codec.mint();
        let new_refresh_grant = NewGrant {
            signature: new_refresh_hash,
            request_id: stored.request_id,
            client_id: stored.client_id.clone(),
            requested_scopes: new_requested_scopes.clone(),
            granted_scopes: new_requested_scopes.clone(),
            requested_audience: stored.requested_audience.clone(),
            granted_audience: stored.granted_audience.clone(),
            subject: stored.subject.clone(),
            form: stored.form.clone(),
        };
        self.grants.put_refresh_token(&new_refresh_grant).await?;

        let (access_handle, access_hash) = self.codec.mint();
        let access_grant = NewGrant {
            signature: access_hash,
            ..clone_grant(&new_refresh_grant)
        };
        self.grants
            .put_access_token(&access_grant, self.lifespans.access_token)
            .await?;

        Ok(TokenResponse {
            access_token: access_handle,
            token_type: "Bearer".to_string(),
            expires_in: self.lifespans.access_token.as_secs() as i64,
            refresh_token: Some(new_refresh_handle),
            id_token: None,
            scope: scopes::join(&new_requested_scopes),
        })
    }

    async fn client_credentials(&self, request: &TokenRequest) -> Result<TokenResponse> {
        let client = self.authenticate_client(request).await?;
        if client.public {
            return Err(OAuthError::UnauthorizedClient);
        }

        let requested = scopes::parse(request.scope.as_deref());
        let granted = scopes::intersect(&requested, &client.scopes);

        let request_id = uuid::Uuid::new_v4();
        let (access_handle, access_hash) = self.codec.mint();
        let grant = NewGrant {
            signature: access_hash,
            request_id,
            client_id: client.client_id.clone(),
            requested_scopes: requested,
            granted_scopes: granted.clone(),
            requested_audience: vec![client.client_id.clone()],
            granted_audience: vec![client.client_id.clone()],
            subject: client.client_id.clone(),
            form: serde_json::json!({}),
        };
        self.grants
            .put_access_token(&grant, self.lifespans.access_token)
            .await?;

        Ok(TokenResponse {
            access_token: access_handle,
            token_type: "Bearer".to_string(),
            expires_in: self.lifespans.access_token.as_secs() as i64,
            refresh_token: None,
            id_token: None,
            scope: scopes::join(&granted),
        })
    }

    fn chrono_lifespan(&self, duration: Duration) -> chrono::Duration {
        chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero())
    }
}

fn clone_grant(grant: &NewGrant) -> NewGrant {
    NewGrant {
        signature: grant.signature.clone(),
        request_id: grant.request_id,
        client_id: grant.client_id.clone(),
        requested_scopes: grant.requested_scopes.clone(),
        granted_scopes: grant.granted_scopes.clone(),
        requested_audience: grant.requested_audience.clone(),
        granted_audience: grant.granted_audience.clone(),
        subject: grant.subject.clone(),
        form: grant.form.clone(),
    }
}

fn map_not_found(err: DatabaseError, mapped: OAuthError) -> OAuthError {
    match err {
        DatabaseError::NotFound => mapped,
        other => other.into(),
    }
}
