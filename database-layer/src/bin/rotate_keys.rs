//! Signing key rotation tool for the Key & JWS Signer (C1).
//!
//! Generates a fresh RSA signing key and writes it to `--output`, leaving the
//! previous key file untouched so an operator can keep serving its JWKS entry
//! for a grace period (see the design note on key rotation in SPEC_FULL.md §9).
//!
//! Usage:
//!   cargo run --bin rotate_keys -- --output /etc/identity/signing_key.pem

use std::path::PathBuf;

use clap::Parser;
use crypto::SigningMaterial;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rotate_keys")]
#[command(about = "Generate a new RSA signing key for the identity service")]
struct Args {
    /// Path to write the new PKCS1 PEM private key to.
    #[arg(long)]
    output: PathBuf,

    /// Overwrite `output` if it already exists.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{:?} already exists; pass --force to overwrite",
            args.output
        );
    }

    let material = tokio::task::spawn_blocking(|| SigningMaterial::load_or_generate(None)).await??;
    let pem = material.to_pem()?;
    std::fs::write(&args.output, pem)?;

    info!(kid = material.kid(), path = ?args.output, "generated new signing key");
    println!("new key id: {}", material.kid());
    Ok(())
}
