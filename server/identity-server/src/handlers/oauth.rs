//! The core OAuth 2.0 / OIDC endpoints (§6): authorize, token, introspect,
//! revoke, userinfo, and the two `.well-known` discovery documents. Every
//! handler is a thin translation between the wire shape and the domain
//! services in `auth-oauth`; no OAuth semantics live here.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use serde_json::{json, Value};

use auth_oauth::models::{
    AuthorizeRequest, IntrospectionRequest, RevocationRequest, TokenRequest, UserProfile,
};
use auth_oauth::{AuthorizeOutcome, OAuthError};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /oauth2/authorize`. With no session cookie this redirects to the login
/// page; with a session but `environment == production` and no prior consent
/// it redirects to the consent page; once both are satisfied it redirects back
/// to the client's `redirect_uri` with `code`/`state`.
pub async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(request): Query<AuthorizeRequest>,
) -> Result<Response, ApiError> {
    let subject = resolve_subject(&state, &headers).await;

    match state
        .authorization
        .authorize(&request, subject.as_ref(), None)
        .await
        .map_err(ApiError::from)?
    {
        AuthorizeOutcome::NeedsLogin => Ok(Redirect::to(&format!(
            "/login?next={}",
            percent_encode(&format!("/oauth2/authorize?{}", uri.query().unwrap_or_default()))
        ))
        .into_response()),
        AuthorizeOutcome::NeedsConsent => Ok(Redirect::to(&format!(
            "/oauth2/consent?next={}",
            percent_encode(&format!("/oauth2/authorize?{}", uri.query().unwrap_or_default()))
        ))
        .into_response()),
        AuthorizeOutcome::Success(success) => Ok(success_redirect(&success)),
    }
}

fn success_redirect(success: &auth_oauth::models::AuthorizeSuccess) -> Response {
    let mut redirect = format!("{}?code={}", success.redirect_uri, success.code);
    if let Some(state_param) = &success.state {
        redirect.push_str(&format!("&state={}", percent_encode(state_param)));
    }
    Redirect::to(&redirect).into_response()
}

/// Percent-encodes everything outside `A-Za-z0-9-_.~`, the set RFC 3986
/// leaves unreserved, so a redirect target survives as a single query value.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
pub struct ConsentDecision {
    pub next: String,
    pub decision: String,
}

/// `POST /oauth2/consent`: re-issues the authorize request with the user's
/// decision attached. Consent persistence is out of scope (§9); only the
/// in-flight redirect records the choice.
pub async fn consent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(decision): Form<ConsentDecision>,
) -> Result<Response, ApiError> {
    let query = decision
        .next
        .strip_prefix("/oauth2/authorize?")
        .unwrap_or(&decision.next);
    let request: AuthorizeRequest = serde_urlencoded::from_str(query)
        .map_err(|e| ApiError::validation(format!("invalid consent redirect target: {e}")))?;

    let subject = resolve_subject(&state, &headers).await;
    let decision = if decision.decision == "approve" {
        Some("approve")
    } else {
        None
    };

    match state
        .authorization
        .authorize(&request, subject.as_ref(), decision)
        .await
        .map_err(ApiError::from)?
    {
        AuthorizeOutcome::Success(success) => Ok(success_redirect(&success)),
        AuthorizeOutcome::NeedsConsent | AuthorizeOutcome::NeedsLogin => Ok(Redirect::to(&format!(
            "{}?error=access_denied",
            request.redirect_uri
        ))
        .into_response()),
    }
}

async fn resolve_subject(state: &AppState, headers: &HeaderMap) -> Option<UserProfile> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    let raw = cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(&format!("{}=", auth_identity::SESSION_COOKIE_NAME)))?;
    let user_id = state.sessions.verify(raw).ok()?;
    let user = state.login.find_user(user_id).await.ok().flatten()?;
    Some(UserProfile {
        subject: user.id.to_string(),
        email: Some(user.email),
        email_verified: Some(user.email_verified),
        preferred_username: user.username,
        name: user.name,
        picture: user.picture,
    })
}

/// `POST /oauth2/token`.
pub async fn token(
    State(state): State<AppState>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<auth_oauth::models::TokenResponse>, ApiError> {
    let response = state.token.dispatch(&request).await?;
    Ok(Json(response))
}

/// `POST /oauth2/introspect`. Client authentication is required (RFC 7662
/// §2.1); this service accepts HTTP Basic only, matching what `ClientRegistry`
/// already verifies for the token endpoint.
pub async fn introspect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(request): Form<IntrospectionRequest>,
) -> Result<Json<auth_oauth::models::IntrospectionResponse>, ApiError> {
    authenticate_basic(&state, &headers).await?;
    Ok(Json(state.introspection.introspect(&request.token).await))
}

/// `POST /oauth2/revoke` (RFC 7009). Idempotent; always `200` once the caller
/// has authenticated, per §4.10.
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(request): Form<RevocationRequest>,
) -> Result<StatusCode, ApiError> {
    authenticate_basic(&state, &headers).await?;
    state.introspection.revoke(&request.token).await?;
    Ok(StatusCode::OK)
}

async fn authenticate_basic(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let (client_id, client_secret) =
        basic_auth(headers).ok_or_else(|| ApiError::from(OAuthError::InvalidClient))?;
    state
        .registry
        .authenticate(&client_id, client_secret.as_deref())
        .await
        .map_err(ApiError::from)?;
    Ok(())
}

fn basic_auth(headers: &HeaderMap) -> Option<(String, Option<String>)> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = header.strip_prefix("Basic ")?;
    let decoded =
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (id, secret) = decoded.split_once(':')?;
    Some((id.to_string(), Some(secret.to_string())))
}

/// `GET /api/v1/userinfo` (OIDC Core §5.3).
pub async fn userinfo(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<auth_oauth::models::UserInfoResponse>, ApiError> {
    let bearer = bearer_token(&headers).ok_or_else(|| ApiError::from(OAuthError::InvalidToken))?;
    let response = state.userinfo.userinfo(&bearer).await?;
    Ok(Json(response))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// `GET /.well-known/jwks.json`.
pub async fn jwks(State(state): State<AppState>) -> Json<crypto::JwksResponse> {
    Json(state.signer.jwks())
}

/// `GET /.well-known/openid-configuration`.
pub async fn discovery(State(state): State<AppState>) -> Json<Value> {
    let issuer = &state.config.issuer;
    Json(json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/oauth2/authorize"),
        "token_endpoint": format!("{issuer}/oauth2/token"),
        "introspection_endpoint": format!("{issuer}/oauth2/introspect"),
        "revocation_endpoint": format!("{issuer}/oauth2/revoke"),
        "userinfo_endpoint": format!("{issuer}/api/v1/userinfo"),
        "jwks_uri": format!("{issuer}/.well-known/jwks.json"),
        "registration_endpoint": format!("{issuer}/register"),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token", "client_credentials"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": ["RS256"],
        "scopes_supported": ["openid", "profile", "email", "offline_access"],
        "token_endpoint_auth_methods_supported": ["client_secret_basic", "none"],
        "code_challenge_methods_supported": ["S256"],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_encode_escapes_reserved_query_characters() {
        let encoded = percent_encode("/oauth2/authorize?client_id=abc&state=xyz");
        assert!(!encoded.contains('&'));
        assert!(!encoded.contains('?'));
        assert!(!encoded.contains('='));
    }
}
