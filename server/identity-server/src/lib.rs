//! Identity Service - OAuth 2.0 authorization server with OIDC extensions
//! and Dynamic Client Registration.
//!
//! This library assembles the HTTP surface: routing, error translation, and
//! the [`AppState`] every handler is built against. The binary entrypoint in
//! `main.rs` wires this router and the validation gRPC service from
//! `auth-gateway` around a shared [`state::AppState`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod validation;

pub use error::{ApiError, ApiResponse};
pub use state::AppState;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router: every route in [`routes::create_routes`]
/// plus the ambient `TraceLayer`/CORS stack (§10.1). No authentication
/// middleware wraps the whole router — each handler that needs a bearer
/// token or session cookie reads it itself, since the auth scheme differs
/// by endpoint (client credentials vs. bearer vs. session cookie vs. none).
pub fn create_app(state: AppState) -> Router {
    routes::create_routes()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}
