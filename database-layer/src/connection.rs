//! Connection pooling and the retry-once-on-transient-error policy shared by every
//! grant store write path.

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::warn;

use crate::error::{DatabaseError, DatabaseResult};

/// Every storage operation MUST complete within this bound, independent of the
/// caller's own context/deadline, so that a redemption in flight cannot be aborted
/// after a successful write but before its response is produced.
pub const STORAGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    pub async fn connect(database_url: &str, max_connections: u32) -> DatabaseResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(15))
            .max_lifetime(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Runs `op` bounded by [`STORAGE_TIMEOUT`], retrying exactly once if the first
/// attempt fails with a transient [`DatabaseError`].
pub async fn with_retry<T, F, Fut>(mut op: F) -> DatabaseResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DatabaseResult<T>>,
{
    match tokio::time::timeout(STORAGE_TIMEOUT, op()).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) if err.is_transient() => {
            warn!(error = %err, "transient storage error, retrying once");
            tokio::time::timeout(STORAGE_TIMEOUT, op())
                .await
                .map_err(|_| DatabaseError::Timeout)?
        }
        Ok(Err(err)) => Err(err),
        Err(_) => Err(DatabaseError::Timeout),
    }
}
