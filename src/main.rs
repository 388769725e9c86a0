//! log-vision server
//!
//! Loads configuration, sets up logging, and serves the view endpoint.

use log_vision::config::default_config_path;
use log_vision::{AppState, VisionConfig, VisionServer};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Main entry point
///
/// # Usage
/// ```bash
/// # Start with the default config (/etc/vision/config.yaml, or
/// # /etc/vision/config.json when only that exists)
/// log-vision
///
/// # Start with a custom config
/// log-vision /path/to/config.yaml
/// ```
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    info!("Starting log-vision");

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    info!("Loading configuration from: {}", config_path.display());

    let config = match VisionConfig::from_file(&config_path) {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            info!("  - Listen: {}:{}", cfg.bind_address, cfg.port);
            info!("  - Aliases: {}", cfg.aliases.len());
            info!("  - Chunk size: {} bytes ({} KB)", cfg.chunk_size, cfg.chunk_size / 1024);
            info!("  - Read timeout: {} seconds", cfg.read_timeout_secs);
            if let Some(max) = cfg.max_limit {
                info!("  - Max limit: {}", max);
            }
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("Please ensure the configuration file exists and is valid");
            std::process::exit(1);
        }
    };

    let addr = config.listen_addr()?;
    let state = Arc::new(AppState::new(config)?);

    VisionServer::new(state, addr).start().await
}
