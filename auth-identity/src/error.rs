use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password does not meet the complexity policy")]
    WeakPassword,

    #[error("invalid or expired session")]
    InvalidSession,

    #[error(transparent)]
    Database(#[from] database_layer::DatabaseError),

    #[error("credential hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
