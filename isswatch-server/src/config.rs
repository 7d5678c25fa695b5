use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::TrackerError;

/// Environment variable holding the OpenCage API key
pub const API_KEY_ENV: &str = "SECRET_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for the rolling log files
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Enable CORS for cross-origin requests
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    #[serde(default = "default_position_api_url")]
    pub position_api_url: String,

    #[serde(default = "default_geocode_api_url")]
    pub geocode_api_url: String,

    /// Timeout for each upstream request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause between two polls of one stream
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Reconnection delay advised to stream clients
    #[serde(default = "default_retry_hint_ms")]
    pub retry_hint_ms: u64,

    /// Idle seconds before a stream sends a keep-alive comment
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_position_api_url() -> String {
    "https://api.wheretheiss.at/v1/satellites/25544".to_string()
}

fn default_geocode_api_url() -> String {
    "https://api.opencagedata.com/geocode/v1/json".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_retry_hint_ms() -> u64 {
    1500
}

fn default_keep_alive_secs() -> u64 {
    15
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            enable_cors: default_enable_cors(),
            position_api_url: default_position_api_url(),
            geocode_api_url: default_geocode_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            retry_hint_ms: default_retry_hint_ms(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

/// Credential for the reverse-geocoding upstream.
///
/// Read once at startup and handed to the classifier at construction; the
/// key is never printed by `Debug`.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn from_value(value: Option<String>) -> Result<Self, TrackerError> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            _ => Err(TrackerError::Configuration(format!(
                "environment variable {} is not set",
                API_KEY_ENV
            ))),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
