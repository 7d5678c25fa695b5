use thiserror::Error;

/// Which upstream a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Position,
    Classification,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Position => "position",
            Upstream::Classification => "classification",
        }
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    /// The position lookup failed or returned something unusable
    #[error("Position upstream failed: {0:#}")]
    UpstreamPosition(#[source] anyhow::Error),

    /// The reverse-geocoding lookup failed or returned something unusable
    #[error("Classification upstream failed: {0:#}")]
    UpstreamClassification(#[source] anyhow::Error),

    /// Startup configuration is incomplete
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TrackerError {
    pub fn upstream(&self) -> Option<Upstream> {
        match self {
            TrackerError::UpstreamPosition(_) => Some(Upstream::Position),
            TrackerError::UpstreamClassification(_) => Some(Upstream::Classification),
            TrackerError::Configuration(_) => None,
        }
    }
}
