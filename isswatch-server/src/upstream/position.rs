use super::PositionSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use isswatch_common::Position;

/// wheretheiss.at client for the live ISS position
pub struct WhereTheIssClient {
    client: reqwest::Client,
    url: String,
}

impl WhereTheIssClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PositionSource for WhereTheIssClient {
    async fn current_position(&self) -> Result<Position> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to send position request")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP error {} from position upstream",
                response.status()
            ));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to read position response")?;

        let position = parse_position(body)?;
        tracing::debug!(
            "Fetched position lat={} lon={} ts={:?}",
            position.latitude,
            position.longitude,
            position.timestamp
        );
        Ok(position)
    }
}

/// Decode the upstream document, rejecting anything without usable coordinates
pub fn parse_position(body: serde_json::Value) -> Result<Position> {
    let position: Position =
        serde_json::from_value(body).context("Unexpected position response shape")?;

    if !position.latitude.is_finite() || !(-90.0..=90.0).contains(&position.latitude) {
        return Err(anyhow::anyhow!("Latitude out of range: {}", position.latitude));
    }
    if !position.longitude.is_finite() || !(-180.0..=180.0).contains(&position.longitude) {
        return Err(anyhow::anyhow!("Longitude out of range: {}", position.longitude));
    }

    Ok(position)
}
