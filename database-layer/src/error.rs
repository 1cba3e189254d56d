use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("not found")]
    NotFound,

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("storage operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Substrings that mark a sqlx error as transient and worth a single retry,
/// per the storage failure semantics in the grant store's write paths.
const TRANSIENT_MARKERS: &[&str] = &[
    "connection",
    "timeout",
    "context deadline exceeded",
    "context canceled",
];

impl DatabaseError {
    pub fn is_transient(&self) -> bool {
        let message = self.to_string().to_lowercase();
        TRANSIENT_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}
