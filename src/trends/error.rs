//! Provider failure taxonomy.
//!
//! Every variant means "no data from this provider right now". The aggregator
//! absorbs all of them; none reaches the caller of `fetch_primary` or
//! `fetch_all_sources`.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Upstream unreachable or the request failed mid-flight.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// Body could not be decoded (bad JSON/XML, missing fields).
    #[error("malformed payload: {0}")]
    Parse(String),

    /// The call did not settle within the per-call budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream responded fine but had nothing usable.
    #[error("no data")]
    Empty,
}

impl ProviderError {
    /// Short, stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Network(_) => "network",
            ProviderError::Status(_) => "status",
            ProviderError::Parse(_) => "parse",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Empty => "empty",
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

impl From<quick_xml::Error> for ProviderError {
    fn from(e: quick_xml::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}
