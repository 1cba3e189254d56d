//! Session-based auth endpoints (§4.13, §4.5): `/api/v1/auth/login|logout|refresh|change-password`.
//! Distinct from the OAuth token endpoint — these manage the `idsess` cookie
//! a resource-owner's browser holds against this service directly.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use auth_identity::models::{LoginRequest, LoginResponse};
use auth_identity::SESSION_COOKIE_NAME;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::state::AppState;

fn with_cookie(cookie: String, body: impl IntoResponse) -> Result<Response, ApiError> {
    let mut response = body.into_response();
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::internal(format!("invalid cookie value: {e}")))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_string)
}

fn session_subject(state: &AppState, headers: &HeaderMap) -> Result<uuid::Uuid, ApiError> {
    let raw = session_cookie(headers).ok_or_else(|| ApiError::unauthorized("no session cookie"))?;
    state.sessions.verify(&raw).map_err(ApiError::from)
}

/// `POST /api/v1/auth/login`.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (response, cookie) = state.login.login(&request).await?;
    with_cookie(cookie, Json(api_success(response)))
}

/// `POST /api/v1/auth/logout`.
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cookie = state.login.logout();
    with_cookie(cookie, StatusCode::NO_CONTENT)
}

/// `POST /api/v1/auth/refresh`: re-issues the session cookie with a fresh expiry.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let raw = session_cookie(&headers).ok_or_else(|| ApiError::unauthorized("no session cookie"))?;
    let cookie = state
        .login
        .refresh_session(&raw)
        .map_err(ApiError::from)?;
    with_cookie(cookie, StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// `POST /api/v1/auth/change-password`.
pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user_id = session_subject(&state, &headers)?;
    state
        .login
        .change_password(user_id, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(api_success(())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_extracts_the_idsess_value_from_a_multi_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; idsess=abc.def; theme=dark"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn session_cookie_is_none_without_a_cookie_header() {
        assert!(session_cookie(&HeaderMap::new()).is_none());
    }
}
