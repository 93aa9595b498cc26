// src/main.rs

//! feedstash trigger server.
//!
//! Serves the HTTP endpoints an external scheduler pings: `/save/{source}`
//! to forward new feed entries to Pocket, `/housekeep` to archive and
//! delete stale saved items.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedstash::config;
use feedstash::error::Result;
use feedstash::server::{self, AppState};
use feedstash::services::{self, FeedFetcher, PocketClient};

/// feedstash - RSS to Pocket forwarder and housekeeper
#[derive(Parser, Debug)]
#[command(name = "feedstash", version, about = "Forwards new RSS articles to Pocket")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Listen address override (default from config)
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("feedstash=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = config::load(&cli.config)?;
    let listen = cli
        .listen
        .unwrap_or_else(|| config.server.listen.clone());

    if config.server.username.is_empty() {
        warn!("server.username is empty; trigger routes are unauthenticated");
    }
    info!(
        "loaded {} sources, batch size {}",
        config.sources.len(),
        config.ingest.batch_size
    );

    let client = services::create_async_client(&config.remote)?;
    let state = AppState {
        stash: Arc::new(PocketClient::new(client.clone(), &config.remote)),
        fetcher: Arc::new(FeedFetcher::new(client)),
        config: Arc::new(config),
    };

    let app = server::router(state);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("feedstash listening on {}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}
