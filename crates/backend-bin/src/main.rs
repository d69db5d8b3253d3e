use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kokupocket_backend_lib::{
    auth::CLEANUP_INTERVAL,
    config::{Settings, DEFAULT_CONFIG_FILE},
    router,
    storage::FlatFileStorage,
    AppState,
};

/// `KokuPocket` API server
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // A missing .env is fine
    dotenvy::dotenv().ok();

    let config = Settings::load_from(&args.config)
        .with_context(|| format!("loading settings from {}", args.config.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(fmt::layer())
        .init();

    // Create storage
    let storage = FlatFileStorage::new(&config.data_dir)
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;

    // Create application state
    let state = Arc::new(AppState::new(storage, &config)?);

    state.lockout.spawn_cleanup(CLEANUP_INTERVAL);

    let app = router::create_router(state);

    // Start the server
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
