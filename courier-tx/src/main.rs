//! courier-tx - Survey Transform Service
//!
//! Accepts survey submissions and converts each into its package of legacy
//! downstream artifacts: fixed-width data file, receipt record, page
//! images, image index and the original response copy, bundled as one zip.

use anyhow::Result;
use clap::Parser;
use courier_common::config::TxConfig;
use courier_tx::{build_router, AppState, Processor};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "courier-tx", version)]
struct Cli {
    /// Path to the TOML config file (overrides COURIER_CONFIG and the
    /// platform default location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address override
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting courier-tx v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config = match &cli.config {
        Some(path) => TxConfig::from_file(path)?,
        None => TxConfig::load()?,
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    info!(
        bind = %config.bind_addr,
        sequencer = config.sequencer_url.as_deref().unwrap_or("derived"),
        "Configuration loaded"
    );

    let processor = Processor::from_config(config.clone())?;
    let state = AppState::new(processor);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
