use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration validation failed: {0}")]
    ValidationError(String),

    #[error("configuration loading failed: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;