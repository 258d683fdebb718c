use anyhow::Result;
use clap::Parser;
use proxy_harvest::server::{serve, AppState};
use proxy_harvest::AppConfig;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Live proxy harvesting and validation API
#[derive(Parser)]
#[command(name = "proxy-harvest")]
#[command(about = "Serves freshly validated live proxies behind an authenticated HTTP endpoint")]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(short, long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    if config.admin_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is not set; every /proxy request will be rejected");
    }

    let state = AppState::from_config(config)?;
    serve(cli.bind, state).await
}
