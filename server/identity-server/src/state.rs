//! Application state: every domain service the HTTP handlers compose,
//! constructed once in `main` and shared behind an [`axum::extract::State`].

use std::sync::Arc;
use std::time::Duration;

use auth_identity::{CredentialStore, LoginController, NullTenantRepository, SessionManager};
use auth_oauth::{
    AuthorizationService, ClientRegistry, DcrService, IntrospectionService, Lifespans,
    TokenService, UserInfoService,
};
use crypto::{SigningMaterial, TokenCodec};
use database_layer::{ClientStore, DbPool, GrantStore, RegistrationTokenStore};
use telemetry::PrometheusHandle;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: DbPool,
    pub registry: Arc<ClientRegistry>,
    pub grants: GrantStore,
    pub signer: Arc<SigningMaterial>,
    pub metrics: Arc<PrometheusHandle>,

    pub authorization: Arc<AuthorizationService>,
    pub token: Arc<TokenService>,
    pub introspection: Arc<IntrospectionService>,
    pub userinfo: Arc<UserInfoService>,
    pub dcr: Arc<DcrService>,

    pub login: Arc<LoginController>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Builds every service from a live `DbPool` and validated config. Called
    /// once at startup; `ClientRegistry::hydrate` must run before the router
    /// starts accepting traffic.
    pub fn new(
        config: AppConfig,
        pool: DbPool,
        signer: SigningMaterial,
        metrics: PrometheusHandle,
        users: Arc<dyn auth_identity::UserRepository>,
        credentials: Arc<dyn auth_identity::CredentialRepository>,
    ) -> crate::error::Result<Self> {
        let config = Arc::new(config);
        let signer = Arc::new(signer);
        let metrics = Arc::new(metrics);

        let grant_codec = Arc::new(
            TokenCodec::new(config.grant_token_secret.clone().into_bytes())
                .map_err(|e| crate::error::ApiError::internal(e.to_string()))?,
        );
        let dcr_codec = TokenCodec::new(config.dcr_token_secret.clone().into_bytes())
            .map_err(|e| crate::error::ApiError::internal(e.to_string()))?;

        let client_store = ClientStore::new(pool.clone());
        let grants = GrantStore::new(pool.clone());
        let registration_tokens = RegistrationTokenStore::new(pool.clone());

        let registry = Arc::new(ClientRegistry::new(client_store));

        let lifespans = Lifespans {
            access_token: Duration::from_secs(config.access_token_lifespan_secs),
            refresh_token: Duration::from_secs(config.refresh_token_lifespan_secs),
            authorize_code: Duration::from_secs(config.authorize_code_lifespan_secs),
            id_token: Duration::from_secs(config.id_token_lifespan_secs),
        };

        let authorization = Arc::new(AuthorizationService::new(
            Arc::clone(&registry),
            grants.clone(),
            Arc::clone(&grant_codec),
            config.issuer.clone(),
            !config.is_production(),
        ));

        let token = Arc::new(TokenService::new(
            Arc::clone(&registry),
            grants.clone(),
            Arc::clone(&grant_codec),
            Arc::clone(&signer),
            lifespans,
        ));

        let introspection = Arc::new(IntrospectionService::new(
            grants.clone(),
            TokenCodec::new(config.grant_token_secret.clone().into_bytes())
                .map_err(|e| crate::error::ApiError::internal(e.to_string()))?,
            config.issuer.clone(),
        ));

        let userinfo = Arc::new(UserInfoService::new(
            grants.clone(),
            TokenCodec::new(config.grant_token_secret.clone().into_bytes())
                .map_err(|e| crate::error::ApiError::internal(e.to_string()))?,
        ));

        let dcr = Arc::new(DcrService::new(
            Arc::clone(&registry),
            ClientStore::new(pool.clone()),
            registration_tokens,
            dcr_codec,
            config.default_client_scope.clone(),
        ));

        let credential_store = CredentialStore::new(Arc::clone(&credentials), config.bcrypt_cost);
        let sessions = Arc::new(SessionManager::new(
            config.session_secret.clone().into_bytes(),
            chrono::Duration::hours(config.session_duration_hours),
            config.session_secure_cookies,
        ));
        let login = Arc::new(LoginController::new(
            users,
            credentials,
            credential_store,
            Arc::new(NullTenantRepository),
            Arc::clone(&sessions),
        ));

        Ok(Self {
            config,
            pool,
            registry,
            grants,
            signer,
            metrics,
            authorization,
            token,
            introspection,
            userinfo,
            dcr,
            login,
            sessions,
        })
    }
}
