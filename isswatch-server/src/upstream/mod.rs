use anyhow::{Context, Result};
use async_trait::async_trait;
use isswatch_common::Position;
use std::time::Duration;

pub mod geocode;
pub mod position;

pub use geocode::OpenCageClient;
pub use position::WhereTheIssClient;

/// Source of the current satellite position
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<Position>;
}

/// Decides whether a coordinate lies over water
#[async_trait]
pub trait WaterClassifier: Send + Sync {
    async fn is_over_water(&self, latitude: f64, longitude: f64) -> Result<bool>;
}

/// Build the HTTP client shared by both upstream clients
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("isswatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}
