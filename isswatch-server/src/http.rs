use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
    Json, Router,
};
use futures::{Stream, StreamExt};
use isswatch_common::StreamEvent;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ApiKey, ServerConfig};
use crate::connection::Connection;
use crate::enricher::SampleEnricher;
use crate::error::TrackerError;
use crate::snapshot::SnapshotService;
use crate::stream::{StreamService, StreamSettings};
use crate::upstream::{build_http_client, OpenCageClient, WhereTheIssClient};

/// Shared, read-only handles for the request handlers
pub struct AppState {
    pub snapshot: SnapshotService,
    pub streams: StreamService,
    /// Cancelled on server shutdown, parent of every stream's liveness token
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the live upstream clients together from configuration
    pub fn from_config(
        config: &ServerConfig,
        api_key: ApiKey,
        shutdown: CancellationToken,
    ) -> anyhow::Result<Self> {
        let client = build_http_client(config.request_timeout())?;
        let positions = Arc::new(WhereTheIssClient::new(client.clone(), &config.position_api_url));
        let classifier = Arc::new(OpenCageClient::new(client, &config.geocode_api_url, api_key));
        let enricher = Arc::new(SampleEnricher::new(positions, classifier));

        let settings = StreamSettings {
            poll_interval: config.poll_interval(),
            retry_hint_ms: config.retry_hint_ms,
            keep_alive: config.keep_alive(),
        };

        Ok(Self {
            snapshot: SnapshotService::new(enricher.clone()),
            streams: StreamService::new(enricher, settings),
            shutdown,
        })
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = match self {
            TrackerError::UpstreamPosition(_) | TrackerError::UpstreamClassification(_) => {
                StatusCode::BAD_GATEWAY
            }
            TrackerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "error": self.to_string(),
            "upstream": self.upstream().map(|u| u.as_str()),
        });
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Stats endpoint - returns basic server information
async fn stats() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "running",
        "service": "isswatch-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn located(State(state): State<Arc<AppState>>) -> Result<Response, TrackerError> {
    let sample = state.snapshot.handle_snapshot_request().await?;
    Ok(Json(sample).into_response())
}

async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let connection = Connection::child_of(&state.shutdown);
    let keep_alive = state.streams.settings().keep_alive;
    tracing::info!("Client subscribed to stream {}", connection.id());

    let events = state
        .streams
        .open_stream(connection)
        .filter_map(|event| async move { to_sse_event(&event) })
        .map(Ok);

    Sse::new(events).keep_alive(KeepAlive::new().interval(keep_alive))
}

/// Encode one event as an SSE frame, `None` if the payload cannot be serialized
pub fn to_sse_event(event: &StreamEvent) -> Option<Event> {
    match Event::default()
        .id(event.id.clone())
        .retry(Duration::from_millis(event.retry_millis))
        .json_data(&event.payload)
    {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::warn!("Failed to encode stream event {}: {}", event.id, e);
            None
        }
    }
}

pub fn router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/located", get(located))
        .route("/stream", get(stream))
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .with_state(state);

    let app = if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}
