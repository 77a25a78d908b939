//! Yoga Journal API Server
//!
//! Run with: cargo run --bin yoga-journal
//!
//! # Configuration
//!
//! Reads `config.toml` from the usual locations (see `yoga-journal-cli config`)
//! or from `--config`. Environment variables override the file:
//! - `YOGA_JOURNAL_STORE`: memory, sqlite or supabase
//! - `YOGA_JOURNAL_DATA_DIR`: directory for journal.db
//! - `YOGA_JOURNAL_API_HOST` / `YOGA_JOURNAL_API_PORT`
//! - `YOGA_JOURNAL_SUPABASE_URL` / `YOGA_JOURNAL_SUPABASE_KEY` / `YOGA_JOURNAL_ACCESS_TOKEN`
//! - `YOGA_JOURNAL_LOG_LEVEL` / `YOGA_JOURNAL_LOG_FORMAT`
//! - `RUST_LOG`: takes precedence over the configured level

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

use yoga_journal::api::{serve, ApiConfig, AppState};
use yoga_journal::config::{Config, LoggingConfig, StoreBackend};
use yoga_journal::store::open_store;

#[derive(Parser)]
#[command(name = "yoga-journal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Yoga practice journal API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the store backend (memory, sqlite, supabase)
    #[arg(long)]
    store: Option<StoreBackend>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(backend) = args.store {
        config.store.backend = backend;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config.logging)?;

    tracing::info!("Starting yoga journal API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        backend = config.store.backend.as_str(),
        data_dir = %config.store.data_dir,
        "Opening entry store"
    );

    let store = open_store(&config.store).context("failed to open entry store")?;
    if let Err(e) = store.ping().await {
        tracing::warn!("Entry store is not reachable yet: {}", e);
    }

    let api_config = ApiConfig::from(&config);
    let state = AppState::new(store, api_config.clone());

    serve(state, &api_config).await?;

    tracing::info!("Yoga journal API server stopped");
    Ok(())
}

/// Install the global subscriber: env filter plus a pretty or JSON fmt layer
fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "yoga_journal={},tower_http=info",
            config.level
        ))
    });

    tracing_subscriber::registry()
        .with(fmt_layer(config)?)
        .with(filter)
        .init();

    Ok(())
}

fn fmt_layer(config: &LoggingConfig) -> anyhow::Result<Box<dyn Layer<Registry> + Send + Sync>> {
    let layer = tracing_subscriber::fmt::layer();

    let Some(path) = &config.file else {
        return Ok(if config.is_json() {
            layer.json().boxed()
        } else {
            layer.boxed()
        });
    };

    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path))?;
    let writer = Mutex::new(file);

    Ok(if config.is_json() {
        layer.json().with_writer(writer).boxed()
    } else {
        layer.with_ansi(false).with_writer(writer).boxed()
    })
}
