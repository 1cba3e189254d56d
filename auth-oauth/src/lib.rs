//! OAuth 2.0 authorization server core with OIDC extensions and Dynamic Client
//! Registration.
//!
//! Covers the Client Registry (C3), Authorization Endpoint (C7), Token Endpoint
//! (C8), Introspection/Revocation (C9), UserInfo (C10), DCR (C11), and the
//! Validation RPC's domain logic (C12, wrapped by `auth-gateway`). Session
//! resolution and credential storage live in `auth-identity`; this crate only
//! consumes a resolved [`models::UserProfile`].

pub mod authorize;
pub mod dcr;
pub mod error;
pub mod introspect;
pub mod models;
pub mod pkce;
pub mod registry;
pub mod scopes;
pub mod token;
pub mod userinfo;
pub mod validation;

pub use authorize::{AuthorizationService, AuthorizeOutcome};
pub use dcr::DcrService;
pub use error::{OAuthError, Result};
pub use introspect::IntrospectionService;
pub use registry::ClientRegistry;
pub use token::{Lifespans, TokenService};
pub use userinfo::UserInfoService;
pub use validation::ValidationService;
