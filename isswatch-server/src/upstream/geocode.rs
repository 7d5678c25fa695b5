use super::WaterClassifier;
use crate::config::ApiKey;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// OpenCage category assigned to oceans, seas and lakes
const WATER_CATEGORY: &str = "natural/water";

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub components: GeocodeComponents,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeComponents {
    #[serde(rename = "_category")]
    pub category: Option<String>,
}

impl GeocodeResponse {
    /// Classify by the category of the best (first) match
    pub fn is_water(&self) -> Result<bool> {
        let first = self
            .results
            .first()
            .ok_or_else(|| anyhow::anyhow!("Geocoding response has no results"))?;

        let category = first
            .components
            .category
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Geocoding result has no category"))?;

        Ok(category == WATER_CATEGORY)
    }
}

/// OpenCage reverse-geocoding client used as the water classifier
pub struct OpenCageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl OpenCageClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn request_url(&self, latitude: f64, longitude: f64) -> Result<reqwest::Url> {
        let query = format!("{} {}", latitude, longitude);
        reqwest::Url::parse_with_params(
            &self.base_url,
            &[("q", query.as_str()), ("key", self.api_key.expose())],
        )
        .context("Invalid geocoding URL")
    }
}

#[async_trait]
impl WaterClassifier for OpenCageClient {
    async fn is_over_water(&self, latitude: f64, longitude: f64) -> Result<bool> {
        let url = self.request_url(latitude, longitude)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP error {} from geocoding upstream",
                response.status()
            ));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .context("Unexpected geocoding response shape")?;

        let over_water = body.is_water()?;
        tracing::debug!(
            "Classified lat={} lon={} over_water={}",
            latitude,
            longitude,
            over_water
        );
        Ok(over_water)
    }
}
