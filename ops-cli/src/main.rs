//! `identityctl`: operator CLI for the identity service — seed OAuth clients,
//! issue Initial Access Tokens for Dynamic Client Registration, and rotate the
//! RS256 signing key. Talks to the same Postgres database and HMAC secrets as
//! `identity-server`; run it against the server's own environment.

use std::path::PathBuf;

use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use crypto::{SigningMaterial, TokenCodec};
use database_layer::models::ClientRow;
use database_layer::{ClientStore, DbPool, RegistrationTokenStore};
use tracing::info;
use uuid::Uuid;

use ops_cli::{token_secret, DbArgs};

#[derive(Parser, Debug)]
#[command(name = "identityctl")]
#[command(about = "Operator CLI for the identity service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register an OAuth client directly against the database, bypassing
    /// Dynamic Client Registration. Intended for bootstrapping a first-party
    /// client before any Initial Access Token exists.
    SeedClient {
        #[arg(long)]
        client_id: Option<String>,
        #[arg(long = "redirect-uri", required = true)]
        redirect_uris: Vec<String>,
        #[arg(long, default_value = "openid profile")]
        scopes: String,
        #[arg(long)]
        public: bool,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Mint an Initial Access Token (C11) and print it once; only its hash is
    /// stored.
    IssueIat {
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 30)]
        ttl_days: i64,
    },
    /// Generate a fresh RS256 signing key (C1), leaving any existing key file
    /// untouched so it can keep serving its JWKS entry during a grace period.
    RotateSigningKey {
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    match cli.command {
        Command::SeedClient {
            client_id,
            redirect_uris,
            scopes,
            public,
            display_name,
        } => seed_client(client_id, redirect_uris, scopes, public, display_name).await,
        Command::IssueIat {
            description,
            ttl_days,
        } => issue_iat(description, ttl_days).await,
        Command::RotateSigningKey { output, force } => rotate_signing_key(output, force).await,
    }
}

async fn seed_client(
    client_id: Option<String>,
    redirect_uris: Vec<String>,
    scopes: String,
    public: bool,
    display_name: Option<String>,
) -> anyhow::Result<()> {
    let db = DbArgs::from_env()?;
    let pool = DbPool::connect(&db.database_url, db.max_connections).await?;
    let clients = ClientStore::new(pool);

    let client_id = client_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let (client_secret, hashed_secret) = if public {
        (None, None)
    } else {
        let secret = Uuid::new_v4().to_string();
        let hashed = bcrypt::hash(&secret, bcrypt::DEFAULT_COST)?;
        (Some(secret), Some(hashed))
    };
    let auth_method = if public { "none" } else { "client_secret_basic" };

    let row = ClientRow {
        client_id: client_id.clone(),
        hashed_secret,
        redirect_uris,
        grant_types: vec![
            "authorization_code".to_string(),
            "refresh_token".to_string(),
        ],
        response_types: vec!["code".to_string()],
        scopes: scopes.split_whitespace().map(str::to_string).collect(),
        audiences: vec![],
        public,
        token_endpoint_auth_method: auth_method.to_string(),
        internal: true,
        display_name,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    clients.upsert(&row).await?;

    info!(%client_id, public, "seeded oauth client");
    println!("client_id: {client_id}");
    if let Some(secret) = client_secret {
        println!("client_secret (store this now, it is not recoverable): {secret}");
    }
    Ok(())
}

async fn issue_iat(description: Option<String>, ttl_days: i64) -> anyhow::Result<()> {
    let db = DbArgs::from_env()?;
    let pool = DbPool::connect(&db.database_url, db.max_connections).await?;
    let tokens = RegistrationTokenStore::new(pool);
    let codec = TokenCodec::new(token_secret("DCR_TOKEN_SECRET")?)?;

    let (handle, hash) = codec.mint();
    let expires_at = Utc::now() + ChronoDuration::days(ttl_days);
    tokens
        .create_iat(&hash, Some(expires_at), description.as_deref())
        .await?;

    info!(ttl_days, "issued initial access token");
    println!("initial_access_token (store this now, it is not recoverable): {handle}");
    Ok(())
}

async fn rotate_signing_key(output: PathBuf, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{output:?} already exists; pass --force to overwrite");
    }
    let material =
        tokio::task::spawn_blocking(|| SigningMaterial::load_or_generate(None)).await??;
    let pem = material.to_pem()?;
    std::fs::write(&output, pem)?;

    info!(kid = material.kid(), path = ?output, "generated new signing key");
    println!("new key id: {}", material.kid());
    Ok(())
}
