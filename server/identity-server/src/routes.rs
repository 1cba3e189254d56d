//! HTTP surface (§6). Every route here corresponds to a named endpoint in the
//! spec's External Interfaces section; nothing else is exposed.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, dcr, health, oauth};
use crate::openapi;
use crate::state::AppState;

/// `/health`, `/version` — no authentication, liveness only.
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/version", get(health::version_info))
        .route("/metrics", get(health::metrics))
}

/// `/oauth2/*` and the two `.well-known` discovery documents.
fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/oauth2/authorize", get(oauth::authorize))
        .route("/oauth2/consent", post(oauth::consent))
        .route("/oauth2/token", post(oauth::token))
        .route("/oauth2/introspect", post(oauth::introspect))
        .route("/oauth2/revoke", post(oauth::revoke))
        .route(
            "/.well-known/openid-configuration",
            get(oauth::discovery),
        )
        .route("/.well-known/jwks.json", get(oauth::jwks))
}

/// Dynamic Client Registration, §4.11.
fn dcr_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(dcr::register))
        .route(
            "/register/:client_id",
            get(dcr::get_client)
                .put(dcr::update_client)
                .delete(dcr::delete_client),
        )
}

/// `/api/v1/*`: UserInfo and the session-based auth endpoints.
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/userinfo", get(oauth::userinfo))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/change-password", post(auth::change_password))
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes())
        .merge(dcr_routes())
        .merge(api_v1_routes())
        .merge(openapi::create_docs_routes())
}
