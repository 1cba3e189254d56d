//! HTTP error boundary (§10.2): every domain error converges on [`ApiError`],
//! which knows how to render itself as the OAuth wire error body (§4, RFC
//! 6749 section 5.2) for the `/oauth2/*` endpoints and as a generic envelope
//! for everything else. Database/crypto/internal detail is sanitized through
//! `error_common::RustCareError` before it reaches a response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use error_common::RustCareError;
use serde::Serialize;

use auth_identity::IdentityError;
use auth_oauth::OAuthError;
use database_layer::DatabaseError;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error surfaced to an HTTP handler. Carries enough to render either shape
/// required by §6: the ten-code OAuth wire error, or a plain message for the
/// DCR/health/auth JSON endpoints.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    oauth_code: Option<&'static str>,
    message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            oauth_code: None,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            oauth_code: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            oauth_code: None,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        let sanitized = RustCareError::system()
            .with_message(message.into())
            .sensitive()
            .build()
            .sanitized();
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            oauth_code: Some("temporarily_unavailable"),
            message: sanitized.message,
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        let code = err.code();
        let status = match code {
            "invalid_client" | "invalid_token" => StatusCode::UNAUTHORIZED,
            "access_denied" => StatusCode::FORBIDDEN,
            "insufficient_scope" => StatusCode::FORBIDDEN,
            "temporarily_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        };
        let message = match &err {
            OAuthError::Database(_) | OAuthError::Crypto(_) | OAuthError::Internal(_) => {
                RustCareError::system()
                    .with_message(err.to_string())
                    .sensitive()
                    .build()
                    .sanitized()
                    .message
            }
            other => other.to_string(),
        };
        Self {
            status,
            oauth_code: Some(code),
            message,
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => Self::unauthorized("invalid username or password"),
            IdentityError::WeakPassword => {
                Self::validation("password does not meet the complexity policy")
            }
            IdentityError::InvalidSession => Self::unauthorized("session is invalid or expired"),
            IdentityError::Database(_) | IdentityError::Hashing(_) | IdentityError::Internal(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        Self::internal(err.to_string())
    }
}

/// Body shape for the ten OAuth wire errors (RFC 6749 §5.2 / RFC 7591 §3.2.2).
#[derive(Serialize)]
struct OAuthErrorBody {
    error: &'static str,
    error_description: String,
}

/// Body shape for every other JSON error response in this service.
#[derive(Serialize)]
struct PlainErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.oauth_code {
            Some(code) => (
                self.status,
                Json(OAuthErrorBody {
                    error: code,
                    error_description: self.message,
                }),
            )
                .into_response(),
            None => (
                self.status,
                Json(PlainErrorBody {
                    error: self.message,
                }),
            )
                .into_response(),
        }
    }
}

/// Success envelope for non-OAuth-spec JSON responses (health, version, DCR
/// metadata). The OAuth/OIDC endpoints return their response bodies bare, per
/// the RFCs they implement, and never go through this wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

pub fn api_success<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_error_maps_invalid_grant_to_bad_request() {
        let api_err: ApiError = OAuthError::InvalidGrant.into();
        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.oauth_code, Some("invalid_grant"));
    }

    #[test]
    fn oauth_error_maps_insufficient_scope_to_forbidden() {
        let api_err: ApiError =
            OAuthError::InsufficientScope("patient:read".to_string()).into();
        assert_eq!(api_err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn identity_error_collapses_to_generic_invalid_credentials_message() {
        let api_err: ApiError = IdentityError::InvalidCredentials.into();
        assert_eq!(api_err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api_err.message, "invalid username or password");
    }
}
