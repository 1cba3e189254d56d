use thiserror::Error;

/// Error kinds for the OAuth/OIDC domain crate (C3, C7-C11). `code()` maps each
/// variant to one of the ten standard OAuth wire error codes; the HTTP boundary
/// in `server/identity-server` uses it to build the response body, never the
/// `Display` text, which may carry more detail than should reach a client.
#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid client")]
    InvalidClient,

    #[error("invalid grant")]
    InvalidGrant,

    #[error("unauthorized client")]
    UnauthorizedClient,

    #[error("unsupported grant type")]
    UnsupportedGrantType,

    #[error("invalid scope")]
    InvalidScope,

    #[error("access denied")]
    AccessDenied,

    #[error("insufficient scope: missing {0}")]
    InsufficientScope(String),

    #[error("invalid token")]
    InvalidToken,

    #[error("temporarily unavailable")]
    TemporarilyUnavailable,

    #[error(transparent)]
    Database(#[from] database_layer::DatabaseError),

    #[error(transparent)]
    Crypto(#[from] crypto::CryptoError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OAuthError>;

impl OAuthError {
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::InvalidRequest(_) => "invalid_request",
            OAuthError::InvalidClient => "invalid_client",
            OAuthError::InvalidGrant => "invalid_grant",
            OAuthError::UnauthorizedClient => "unauthorized_client",
            OAuthError::UnsupportedGrantType => "unsupported_grant_type",
            OAuthError::InvalidScope => "invalid_scope",
            OAuthError::AccessDenied => "access_denied",
            OAuthError::InsufficientScope(_) => "insufficient_scope",
            OAuthError::InvalidToken => "invalid_token",
            OAuthError::TemporarilyUnavailable => "temporarily_unavailable",
            OAuthError::Database(e) if e.is_transient() => "temporarily_unavailable",
            OAuthError::Database(_) | OAuthError::Crypto(_) | OAuthError::Internal(_) => {
                "temporarily_unavailable"
            }
        }
    }
}
