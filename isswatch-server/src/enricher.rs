use std::sync::Arc;

use isswatch_common::EnrichedSample;

use crate::error::TrackerError;
use crate::upstream::{PositionSource, WaterClassifier};

/// Pairs a fresh position with a fresh water classification
pub struct SampleEnricher {
    positions: Arc<dyn PositionSource>,
    classifier: Arc<dyn WaterClassifier>,
}

impl SampleEnricher {
    pub fn new(positions: Arc<dyn PositionSource>, classifier: Arc<dyn WaterClassifier>) -> Self {
        Self {
            positions,
            classifier,
        }
    }

    /// One position lookup followed by one classification, never cached or retried
    pub async fn fetch_enriched_sample(&self) -> Result<EnrichedSample, TrackerError> {
        let position = self
            .positions
            .current_position()
            .await
            .map_err(TrackerError::UpstreamPosition)?;

        let over_water = self
            .classifier
            .is_over_water(position.latitude, position.longitude)
            .await
            .map_err(TrackerError::UpstreamClassification)?;

        Ok(EnrichedSample::new(position, over_water))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeClassifier, FakePositions};
    use super::*;
    use isswatch_common::Position;

    #[tokio::test]
    async fn test_enriches_position() {
        let positions = Arc::new(FakePositions::fixed(Position::new(45.0, -30.0)));
        let classifier = Arc::new(FakeClassifier::always(true));
        let enricher = SampleEnricher::new(positions.clone(), classifier.clone());

        let sample = enricher.fetch_enriched_sample().await.unwrap();

        assert!(sample.over_water);
        assert_eq!(sample.position.latitude, 45.0);
        assert_eq!(*classifier.seen.lock().unwrap(), vec![(45.0, -30.0)]);
    }

    #[tokio::test]
    async fn test_position_failure_skips_classification() {
        let positions = Arc::new(FakePositions::scripted(
            Position::new(0.0, 0.0),
            vec![Err(anyhow::anyhow!("connection refused"))],
        ));
        let classifier = Arc::new(FakeClassifier::always(true));
        let enricher = SampleEnricher::new(positions, classifier.clone());

        let err = enricher.fetch_enriched_sample().await.unwrap_err();

        assert!(matches!(err, TrackerError::UpstreamPosition(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_classification_failure() {
        let positions = Arc::new(FakePositions::fixed(Position::new(1.0, 2.0)));
        let classifier = Arc::new(FakeClassifier::scripted(
            true,
            vec![Err(anyhow::anyhow!("HTTP error 402"))],
        ));
        let enricher = SampleEnricher::new(positions, classifier);

        let err = enricher.fetch_enriched_sample().await.unwrap_err();
        assert!(matches!(err, TrackerError::UpstreamClassification(_)));
    }

    #[tokio::test]
    async fn test_every_fetch_hits_both_upstreams() {
        let positions = Arc::new(FakePositions::counting());
        let classifier = Arc::new(FakeClassifier::always(false));
        let enricher = SampleEnricher::new(positions.clone(), classifier.clone());

        let first = enricher.fetch_enriched_sample().await.unwrap();
        let second = enricher.fetch_enriched_sample().await.unwrap();

        assert_eq!(positions.calls(), 2);
        assert_eq!(classifier.calls(), 2);
        assert_eq!(first.position.timestamp, Some(1));
        assert_eq!(second.position.timestamp, Some(2));
    }
}
