//! Identity service entrypoint: loads configuration (§10.3), opens the
//! database pool, builds every domain service behind `AppState`, and serves
//! the OAuth/OIDC HTTP API alongside the validation gRPC service from
//! `auth-gateway` (C12).

use std::net::SocketAddr;
use std::sync::Arc;

use auth_identity::{PgCredentialRepository, PgUserRepository};
use auth_oauth::ValidationService;
use clap::Parser;
use config_engine::ConfigEngine;
use crypto::{SigningMaterial, TokenCodec};
use database_layer::{DbPool, GrantStore};
use identity_server::config::AppConfig;
use identity_server::state::AppState;
use identity_server::{create_app, ApiError};
use logger_redacted::redacted_info;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "identity-server")]
struct Args {
    /// Deployment environment; selects `config/<environment>.yaml`.
    #[arg(long, env = "IDENTITY_ENVIRONMENT", default_value = "development")]
    environment: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let args = Args::parse();
    let config: AppConfig = ConfigEngine::new(&AppConfig::default(), &args.environment, "IDENTITY_")
        .extract()
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
    config.validate().map_err(|e: ApiError| anyhow::anyhow!("{e:?}"))?;

    redacted_info!(environment = %config.environment, issuer = %config.issuer, "starting identity service");

    let pool = DbPool::connect(&config.database_url, config.database_max_connections).await?;
    let signer = SigningMaterial::load_or_generate(config.signing_key_path.as_deref().map(std::path::Path::new))?;
    let metrics = telemetry::metrics::install()?;

    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let credentials = Arc::new(PgCredentialRepository::new(pool.clone()));

    let state = AppState::new(config.clone(), pool.clone(), signer, metrics, users, credentials)
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    state
        .registry
        .hydrate()
        .await
        .map_err(|e| anyhow::anyhow!("failed to hydrate client registry: {e}"))?;

    let validation_codec = TokenCodec::new(config.grant_token_secret.clone().into_bytes())?;
    let validation = Arc::new(ValidationService::new(
        GrantStore::new(pool.clone()),
        validation_codec,
        config.issuer.clone(),
    ));

    let http_addr: SocketAddr = format!("{}:{}", config.bind_address, config.http_port).parse()?;
    let grpc_addr: SocketAddr = format!("{}:{}", config.bind_address, config.grpc_port).parse()?;

    let app = create_app(state);
    let http_server = async {
        let listener = tokio::net::TcpListener::bind(http_addr).await?;
        info!(%http_addr, "listening for HTTP");
        axum::serve(listener, app).await?;
        Ok::<(), anyhow::Error>(())
    };
    let grpc_server = async {
        auth_gateway::serve(grpc_addr, validation).await?;
        Ok::<(), anyhow::Error>(())
    };

    tokio::try_join!(http_server, grpc_server)?;
    Ok(())
}
