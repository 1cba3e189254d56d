use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

/// OpenAPI documentation for the identity service's HTTP surface (§6).
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,
    ),
    components(
        schemas(
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness and version endpoints"),
        (name = "oauth", description = "OAuth 2.0 / OIDC authorization, token, introspection and revocation"),
        (name = "dcr", description = "Dynamic Client Registration (RFC 7591)"),
        (name = "auth", description = "Session-based login, logout and password management"),
    ),
    info(
        title = "Identity Service API",
        version = "1.0.0",
        description = "OAuth 2.0 authorization server with OIDC extensions and Dynamic Client Registration.",
    ),
)]
pub struct ApiDoc;

/// `/docs` and `/api-docs/openapi.json`.
pub fn create_docs_routes() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
