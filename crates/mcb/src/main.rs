//! Binary entrypoint: parses CLI flags, loads configuration, wires every
//! concrete provider into `Services`, and serves the `mcb-server` router.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mcb_infrastructure::Config;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mcb", author, version, about = "Discovery processing engine")]
struct Cli {
    /// Path to a TOML config file overlaying the built-in defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address the HTTP server binds to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let bind = cli.bind;

    let services = Arc::new(mcb::wiring::build_services(config));
    let app = mcb_server::router(services);

    tracing::info!(%bind, "starting discovery processing engine");
    let listener = tokio::net::TcpListener::bind(bind).await.context("failed to bind HTTP listener")?;
    axum::serve(listener, app).await.context("HTTP server exited with an error")?;

    Ok(())
}
