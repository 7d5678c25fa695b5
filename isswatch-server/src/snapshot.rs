use std::sync::Arc;

use isswatch_common::EnrichedSample;

use crate::enricher::SampleEnricher;
use crate::error::TrackerError;

/// Single-shot lookup behind `GET /located`
#[derive(Clone)]
pub struct SnapshotService {
    enricher: Arc<SampleEnricher>,
}

impl SnapshotService {
    pub fn new(enricher: Arc<SampleEnricher>) -> Self {
        Self { enricher }
    }

    pub async fn handle_snapshot_request(&self) -> Result<EnrichedSample, TrackerError> {
        let result = self.enricher.fetch_enriched_sample().await;
        if let Err(e) = &result {
            tracing::warn!("Snapshot request failed: {}", e);
        }
        result
    }
}
