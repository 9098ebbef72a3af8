//! Error types for gateway calls.

use thiserror::Error;

/// Errors returned by the build-server gateway.
///
/// The scrape pipeline treats all of these the same way (log and drop the
/// affected item); the prober cares about [`GatewayError::Unauthorized`]
/// only for its log message.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("credentials rejected by {url}")]
    Unauthorized { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
