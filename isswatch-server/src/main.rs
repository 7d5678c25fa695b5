use isswatch_server::config::{ServerConfig, API_KEY_ENV};

use anyhow::Result;
use tokio_util::sync::CancellationToken;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ServerConfig::load_or_default(CONFIG_PATH)?;

    // Initialize logging
    let _logging_guard = isswatch_server::logging::init_logging(
        &config.log_dir,
        "isswatch-server",
        &config.log_level,
    )?;

    tracing::info!("isswatch server starting...");
    tracing::debug!("Loaded configuration: {:?}", config);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received, closing streams");
                signal_token.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    // Credential check happens inside run, ahead of the bind
    isswatch_server::server::run(config, std::env::var(API_KEY_ENV).ok(), shutdown).await
}
