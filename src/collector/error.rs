use thiserror::Error;

use crate::discovery::DiscoveryError;

/// Why a single endpoint or class produced nothing for the store this cycle
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("could not decode stats: {0}")]
    Decode(#[from] serde_json::Error),

    /// The leaf answered with an already aggregated view
    #[error("response carries populated {field} mapping, endpoint looks misrouted")]
    Misrouted { field: &'static str },
}

impl CollectError {
    /// Misrouted payloads point at a topology defect rather than a
    /// transient failure
    pub fn is_misrouted(&self) -> bool {
        matches!(self, CollectError::Misrouted { .. })
    }
}
