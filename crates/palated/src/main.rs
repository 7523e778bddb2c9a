//! palated - Palate review service daemon
//!
//! Reads store settings from `PALATE_DB_*` and sentiment service settings
//! from `NLP_SERVICE_*`; a `.env` file in the working directory is loaded
//! first when present.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use palate_core::{init_tracing, PipelineConfig, ReviewPipeline};
use palate_state::SurrealStore;
use sentiment_oracle::{HttpSentimentOracle, OracleConfig};
use tokio::net::TcpListener;
use tracing::{info, Level};

#[derive(Debug, Parser)]
#[command(name = "palated")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Restaurant review ingestion and sentiment leaderboard service", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "PALATE_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "PALATE_LOG_JSON")]
    json_logs: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json_logs, level);

    let store = SurrealStore::from_env()
        .await
        .context("failed to open the review store")?;

    let oracle_config = OracleConfig::from_env()?;
    info!(url = %oracle_config.base_url, timeout_ms = oracle_config.timeout.as_millis() as u64, "sentiment service configured");
    let config = PipelineConfig::default().with_upstream_timeout(oracle_config.timeout);
    let oracle = HttpSentimentOracle::new(oracle_config)?;

    let pipeline = Arc::new(ReviewPipeline::with_config(store, oracle, config));
    let app = palated::create_router(pipeline);

    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind to {}", cli.bind))?;
    info!("palated listening on {}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("palated stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested, draining connections");
}
