//! Session Manager (C5), Credential Store (C6), and the Login/Password
//! Controller (C13) that bridges them into the `/login` contract consumed by
//! the authorization endpoint in `auth-oauth`.

pub mod config;
pub mod credentials;
pub mod error;
pub mod login;
pub mod models;
pub mod repository;
pub mod session;

pub use config::IdentityConfig;
pub use credentials::CredentialStore;
pub use error::{IdentityError, Result};
pub use login::LoginController;
pub use repository::{
    CredentialRepository, NullTenantRepository, PgCredentialRepository, PgUserRepository,
    TenantRepository, UserRepository,
};
pub use session::{SessionManager, SESSION_COOKIE_NAME};
