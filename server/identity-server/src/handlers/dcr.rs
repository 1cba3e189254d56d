//! Dynamic Client Registration (§4.11, RFC 7591): `/register` and
//! `/register/{client_id}`.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;

use auth_oauth::models::{ClientMetadata, RegisterClientRequest, RegisterClientResponse};
use auth_oauth::OAuthError;

use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or_else(|| ApiError::from(OAuthError::AccessDenied))
}

/// `POST /register`, authenticated by the Initial Access Token.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterClientRequest>,
) -> Result<Json<RegisterClientResponse>, ApiError> {
    let iat = bearer_token(&headers)?;
    let response = state.dcr.register(&iat, &request).await?;
    Ok(Json(response))
}

/// `GET /register/{client_id}`, authenticated by the client's own
/// Registration Access Token.
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ClientMetadata>, ApiError> {
    let rat = bearer_token(&headers)?;
    let metadata = state.dcr.get(&client_id, &rat).await?;
    Ok(Json(metadata))
}

/// `PUT /register/{client_id}`.
pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RegisterClientRequest>,
) -> Result<Json<ClientMetadata>, ApiError> {
    let rat = bearer_token(&headers)?;
    let metadata = state.dcr.update(&client_id, &rat, &request).await?;
    Ok(Json(metadata))
}

/// `DELETE /register/{client_id}`.
pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let rat = bearer_token(&headers)?;
    state.dcr.delete(&client_id, &rat).await?;
    Ok(StatusCode::NO_CONTENT)
}
