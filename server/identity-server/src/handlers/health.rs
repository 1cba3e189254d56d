//! `/health` and `/version` (§10.4): liveness only, no OAuth semantics.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "2026-07-31T10:30:00Z")]
    pub timestamp: String,
    pub checks: HashMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    #[schema(example = "identity-server")]
    pub name: String,
    #[schema(example = "1.0.0")]
    pub version: String,
}

/// `GET /health`.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let mut checks = HashMap::new();
    checks.insert(
        "database".to_string(),
        if state.pool.is_healthy().await {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
    );

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks,
    };

    Ok(Json(api_success(response)))
}

/// `GET /version`.
#[utoipa::path(
    get,
    path = "/version",
    tag = "health",
    responses((status = 200, description = "Version information", body = VersionResponse))
)]
pub async fn version_info() -> Json<ApiResponse<VersionResponse>> {
    Json(api_success(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// `GET /metrics`: Prometheus scrape endpoint (§10.5).
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
