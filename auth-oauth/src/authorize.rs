//! Authorization Endpoint (C7).

use std::sync::Arc;

use chrono::Utc;
use crypto::TokenCodec;
use database_layer::GrantStore;
use database_layer::models::NewGrant;
use uuid::Uuid;

use crate::error::{OAuthError, Result};
use crate::models::{AuthorizeRequest, AuthorizeSuccess, OidcSessionClaims, UserProfile};
use crate::pkce::METHOD_S256;
use crate::registry::ClientRegistry;
use crate::scopes;

pub enum AuthorizeOutcome {
    /// No valid session; caller should redirect to the login page with
    /// `redirect_uri` set to the current request URL.
    NeedsLogin,
    /// `environment == production` and consent has not been granted yet.
    NeedsConsent,
    Success(AuthorizeSuccess),
}

pub struct AuthorizationService {
    registry: Arc<ClientRegistry>,
    grants: GrantStore,
    codec: Arc<TokenCodec>,
    issuer: String,
    development: bool,
}

impl AuthorizationService {
    pub fn new(
        registry: Arc<ClientRegistry>,
        grants: GrantStore,
        codec: Arc<TokenCodec>,
        issuer: String,
        development: bool,
    ) -> Self {
        Self {
            registry,
            grants,
            codec,
            issuer,
            development,
        }
    }

    /// `consent` is `Some("approve")` once the consent controller has re-issued the
    /// redirect back with approval; `None`/anything else means "not yet decided".
    pub async fn authorize(
        &self,
        request: &AuthorizeRequest,
        subject: Option<&UserProfile>,
        consent: Option<&str>,
    ) -> Result<AuthorizeOutcome> {
        let client = self.registry.get(&request.client_id).await?;

        if request.response_type != "code" || !client.response_types.iter().any(|r| r == "code") {
            return Err(OAuthError::InvalidRequest(
                "unsupported response_type".to_string(),
            ));
        }
        if !client.redirect_uris.iter().any(|u| u == &request.redirect_uri) {
            return Err(OAuthError::InvalidRequest(
                "redirect_uri does not match a registered value".to_string(),
            ));
        }

        let requested_scopes = scopes::parse(request.scope.as_deref());
        if !scopes::is_subset(&requested_scopes, &client.scopes) {
            return Err(OAuthError::InvalidScope);
        }

        if client.public {
            match request.code_challenge_method.as_deref() {
                Some(METHOD_S256) if request.code_challenge.is_some() => {}
                _ => {
                    return Err(OAuthError::InvalidRequest(
                        "PKCE with code_challenge_method=S256 is required for public clients"
                            .to_string(),
                    ));
                }
            }
        }

        let Some(profile) = subject else {
            return Ok(AuthorizeOutcome::NeedsLogin);
        };

        if !self.development && consent != Some("approve") {
            return Ok(AuthorizeOutcome::NeedsConsent);
        }

        let granted_scopes = requested_scopes.clone();
        let granted_audience = vec![client.client_id.clone()];
        let request_id = Uuid::new_v4();
        let now = Utc::now();

        let claims = OidcSessionClaims {
            sub: profile.subject.clone(),
            aud: vec![client.client_id.clone()],
            iss: self.issuer.clone(),
            auth_time: now.timestamp(),
            nonce: request.nonce.clone(),
            email: profile.email.clone(),
            email_verified: profile.email_verified,
            preferred_username: profile.preferred_username.clone(),
            name: profile.name.clone(),
            picture: profile.picture.clone(),
            extra: Default::default(),
        };

        let (handle, signature) = self.codec.mint();

        let grant = NewGrant {
            signature: signature.clone(),
            request_id,
            client_id: client.client_id.clone(),
            requested_scopes,
            granted_scopes,
            requested_audience: granted_audience.clone(),
            granted_audience,
            subject: profile.subject.clone(),
            form: serde_json::json!({
                "redirect_uri": request.redirect_uri,
                "nonce": request.nonce,
                "email": profile.email,
                "email_verified": profile.email_verified,
                "preferred_username": profile.preferred_username,
                "name": profile.name,
                "picture": profile.picture,
            }),
        };

        self.grants.put_authz_code(&grant).await?;
        self.grants
            .put_oidc_session(&signature, request_id, &serde_json::to_value(&claims)?)
            .await?;
        if let (Some(challenge), Some(method)) =
            (&request.code_challenge, &request.code_challenge_method)
        {
            self.grants.put_pkce(&signature, challenge, method).await?;
        }

        Ok(AuthorizeOutcome::Success(AuthorizeSuccess {
            redirect_uri: request.redirect_uri.clone(),
            code: handle,
            state: request.state.clone(),
            response_mode: request.response_mode.clone(),
        }))
    }
}

impl From<serde_json::Error> for OAuthError {
    fn from(e: serde_json::Error) -> Self {
        OAuthError::Internal(e.into())
    }
}
