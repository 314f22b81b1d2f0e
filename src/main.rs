use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::{info, warn};

use asset_proxy::comms::proxy_api::{self, AppState};
use asset_proxy::config::{CredentialSource, DEFAULT_CONFIG_PATH, PRIVATE_KEY_ENV};
use asset_proxy::operations::AssetProxy;
use asset_proxy::upstream::{ImageKitClient, DEFAULT_API_BASE};
use asset_proxy::utils;

#[derive(Parser)]
#[command(name = "asset-proxy", version, about = "ImageKit asset-management proxy")]
struct AppCli {
    /// Config file holding the ImageKit private key (read on every request)
    #[arg(short, long, env = "ASSET_PROXY_CONFIG", default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", global = true)]
    log_json: bool,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP proxy (the default)
    Serve,
    /// Load the credential once and report whether it is usable
    CheckConfig,
}

#[derive(clap::Args)]
struct ServeArgs {
    #[arg(long, env = "PORT", default_value_t = 3000, global = true)]
    port: u16,

    #[arg(long, default_value = "0.0.0.0", global = true)]
    bind: IpAddr,

    /// ImageKit REST API base URL
    #[arg(long, env = "IMAGEKIT_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    api_base: String,

    /// Upstream request timeout
    #[arg(long, default_value_t = 30, global = true)]
    timeout_secs: u64,
}

fn credential_source(path: &str) -> CredentialSource {
    CredentialSource::new(path).with_env_fallback(PRIVATE_KEY_ENV)
}

async fn serve(config_path: &str, args: ServeArgs) -> Result<()> {
    let credentials = credential_source(config_path);
    if let Err(e) = credentials.load().await {
        warn!("credential not loadable yet: {}", e);
    }

    let client = ImageKitClient::new(&args.api_base, Duration::from_secs(args.timeout_secs))?;
    info!(
        config = %config_path,
        api_base = %client.base_url(),
        timeout_secs = args.timeout_secs,
        "starting asset proxy"
    );

    let state = AppState::new(AssetProxy::new(credentials, client));
    proxy_api::serve(state, SocketAddr::new(args.bind, args.port)).await
}

async fn check_config(config_path: &str) -> Result<()> {
    let credentials = credential_source(config_path);
    credentials
        .load()
        .await
        .with_context(|| format!("loading credential from {}", credentials.path().display()))?;
    println!("credential available (config: {})", credentials.path().display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AppCli::parse();
    utils::logging::init(args.log_json);
    info!(version = asset_proxy::VERSION, "asset-proxy");

    match args.command {
        Some(Commands::CheckConfig) => check_config(&args.config).await?,
        Some(Commands::Serve) | None => serve(&args.config, args.serve).await?,
    }

    Ok(())
}
