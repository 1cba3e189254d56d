//! Persistence layer for the identity service's grant store (C4), client table,
//! and DCR registration tokens.

pub mod client_store;
pub mod connection;
pub mod error;
pub mod grant_store;
pub mod models;
pub mod registration_tokens;

pub use client_store::ClientStore;
pub use connection::{with_retry, DbPool, STORAGE_TIMEOUT};
pub use error::{DatabaseError, DatabaseResult};
pub use grant_store::GrantStore;
pub use registration_tokens::RegistrationTokenStore;
