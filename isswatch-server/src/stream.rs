use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use isswatch_common::StreamEvent;
use tracing::{debug, info, warn};

use crate::connection::{CloseOnDrop, Connection, StreamState};
use crate::enricher::SampleEnricher;

/// Timing of one polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Pause after every poll, matching or not
    pub poll_interval: Duration,
    /// Reconnection advice attached to each event
    pub retry_hint_ms: u64,
    /// Idle time after which the transport sends a comment frame
    pub keep_alive: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            retry_hint_ms: 1500,
            keep_alive: Duration::from_secs(15),
        }
    }
}

/// Per-connection polling loop behind `GET /stream`
#[derive(Clone)]
pub struct StreamService {
    enricher: Arc<SampleEnricher>,
    settings: StreamSettings,
}

impl StreamService {
    pub fn new(enricher: Arc<SampleEnricher>, settings: StreamSettings) -> Self {
        Self { enricher, settings }
    }

    pub fn settings(&self) -> StreamSettings {
        self.settings
    }

    /// Start polling for `connection` and yield only over-water samples, in poll order.
    ///
    /// The stream ends once the connection's liveness token is cancelled. Dropping
    /// the stream cancels the token and marks the connection closed.
    pub fn open_stream(&self, connection: Connection) -> BoxStream<'static, StreamEvent> {
        let enricher = self.enricher.clone();
        let settings = self.settings;
        // Armed before the first poll so an unpolled stream still closes on drop
        let guard = CloseOnDrop(connection.clone());

        let events = async_stream::stream! {
            let _guard = guard;
            let liveness = connection.liveness().clone();
            let mut polls: u64 = 0;
            let mut emitted: u64 = 0;

            connection.transition(StreamState::Active);
            info!("Stream {} opened", connection.id());

            loop {
                if liveness.is_cancelled() {
                    break;
                }
                polls += 1;

                let outcome = tokio::select! {
                    biased;
                    _ = liveness.cancelled() => break,
                    outcome = enricher.fetch_enriched_sample() => outcome,
                };

                match outcome {
                    Ok(sample) if sample.over_water => {
                        let event = StreamEvent::new(sample, settings.retry_hint_ms);
                        debug!(
                            "Stream {} poll {} emitting event {} observed at {:?}",
                            connection.id(),
                            polls,
                            event.id,
                            event.payload.position.observed_at()
                        );
                        emitted += 1;
                        yield event;
                    }
                    Ok(_) => {
                        debug!("Stream {} poll {} not over water", connection.id(), polls);
                    }
                    Err(e) => {
                        warn!("Stream {} poll {} skipped: {}", connection.id(), polls, e);
                    }
                }

                tokio::select! {
                    biased;
                    _ = liveness.cancelled() => break,
                    _ = tokio::time::sleep(settings.poll_interval) => {}
                }
            }

            connection.transition(StreamState::Closing);
            info!(
                "Stream {} closing after {} polls, {} events",
                connection.id(),
                polls,
                emitted
            );
        };

        Box::pin(events)
    }
}
