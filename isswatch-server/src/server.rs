use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{ApiKey, ServerConfig};
use crate::http::{self, AppState};

/// Validate the credential, bind, and serve until `shutdown` is cancelled.
///
/// A missing credential returns `TrackerError::Configuration` before any
/// socket is bound.
pub async fn run(
    config: ServerConfig,
    api_key: Option<String>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let api_key = match ApiKey::from_value(api_key) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    let state = Arc::new(AppState::from_config(&config, api_key, shutdown.clone())?);
    let app = http::router(state, config.enable_cors);

    let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    tracing::info!(
        "Polling every {:?}, advising clients to retry after {} ms",
        config.poll_interval(),
        config.retry_hint_ms
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("isswatch server stopped");
    Ok(())
}
