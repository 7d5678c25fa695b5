use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Wire name of the water classification flag.
pub const ABOVE_WATER_FIELD: &str = "above_water";

/// Satellite position as reported by the position upstream
///
/// Fields other than latitude, longitude and timestamp are kept verbatim in
/// `extra` and serialized back at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp: None,
            extra: Map::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Upstream timestamp as a UTC datetime, if present and in range
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

/// A position paired with its water/land classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSample {
    #[serde(flatten)]
    pub position: Position,
    #[serde(rename = "above_water")]
    pub over_water: bool,
}

impl EnrichedSample {
    pub fn new(mut position: Position, over_water: bool) -> Self {
        // The classification always wins over an upstream field of the same name
        position.extra.remove(ABOVE_WATER_FIELD);
        Self {
            position,
            over_water,
        }
    }
}

/// One qualifying sample pushed to a streaming client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Opaque, unique per event
    pub id: String,
    /// Reconnection advice for the client, in milliseconds
    pub retry_millis: u64,
    pub payload: EnrichedSample,
}

impl StreamEvent {
    pub fn new(payload: EnrichedSample, retry_millis: u64) -> Self {
        Self {
            id: Uuid::now_v7().simple().to_string(),
            retry_millis,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enriched_sample_wire_shape() {
        let sample = EnrichedSample::new(Position::new(45.0, -30.0), true);
        let value = serde_json::to_value(&sample).unwrap();

        assert_eq!(
            value,
            json!({ "latitude": 45.0, "longitude": -30.0, "above_water": true })
        );
    }

    #[test]
    fn test_upstream_fields_pass_through() {
        let raw = json!({
            "name": "iss",
            "id": 25544,
            "latitude": 12.5,
            "longitude": 100.25,
            "altitude": 418.2,
            "visibility": "daylight",
            "timestamp": 1700000000,
            "units": "kilometers"
        });
        let position: Position = serde_json::from_value(raw).unwrap();
        assert_eq!(position.timestamp, Some(1700000000));
        assert_eq!(position.extra.get("name"), Some(&json!("iss")));
        assert!(!position.extra.contains_key("latitude"));

        let value = serde_json::to_value(EnrichedSample::new(position, false)).unwrap();
        assert_eq!(value["id"], json!(25544));
        assert_eq!(value["visibility"], json!("daylight"));
        assert_eq!(value["timestamp"], json!(1700000000));
        assert_eq!(value["above_water"], json!(false));
    }

    #[test]
    fn test_classification_overrides_upstream_field() {
        let mut position = Position::new(1.0, 2.0);
        position.extra.insert(ABOVE_WATER_FIELD.to_string(), json!(false));

        let value = serde_json::to_value(EnrichedSample::new(position, true)).unwrap();
        assert_eq!(value["above_water"], json!(true));
    }

    #[test]
    fn test_observed_at() {
        let position = Position::new(0.0, 0.0).with_timestamp(1700000000);
        let observed = position.observed_at().unwrap();
        assert_eq!(observed.timestamp(), 1700000000);
        assert!(Position::new(0.0, 0.0).observed_at().is_none());
    }

    #[test]
    fn test_stream_event_ids_are_unique() {
        let sample = EnrichedSample::new(Position::new(45.0, -30.0), true);
        let first = StreamEvent::new(sample.clone(), 1500);
        let second = StreamEvent::new(sample, 1500);

        assert_ne!(first.id, second.id);
        assert_eq!(first.id.len(), 32);
        assert_eq!(first.retry_millis, 1500);
    }
}
