//! Greenpoint server binary

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use greenpoint::{config::Args, logging, server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(&args.log_level, args.log_json);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Greenpoint - recycling engagement");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", args.mode());
    info!("Store: {:?}", args.store);
    info!("MongoDB: {} / {}", args.mongodb_uri, args.mongodb_db);
    if let Some(ref path) = args.activity_log {
        info!("Activity journal: {}", path.display());
    }
    info!("======================================");

    let state = match AppState::connect(args).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize record store: {}", e);
            std::process::exit(1);
        }
    };

    server::run(state).await?;

    info!("Greenpoint stopped");
    Ok(())
}
