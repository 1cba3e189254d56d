use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("metrics collection failed")]
    MetricsError,

    #[error("internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;