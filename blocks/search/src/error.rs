//! Error types for index and catalog fetches.

use thiserror::Error;

/// Failure to load one object from a backing store or the external API.
///
/// None of these fail a search on their own: callers log and degrade.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, TLS or body read failure.
    #[error("transport error fetching {key}: {source}")]
    Transport {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status.
    #[error("{key} returned HTTP {status}")]
    Status { key: String, status: u16 },

    /// Object does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Fetch exceeded its deadline.
    #[error("timed out fetching {0}")]
    Timeout(String),

    /// Payload was not the JSON we expected.
    #[error("malformed JSON in {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Object storage SDK failure.
    #[error("storage error fetching {key}: {message}")]
    Storage { key: String, message: String },
}

impl FetchError {
    pub(crate) fn from_reqwest(key: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(key.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                key: key.to_string(),
                source: err,
            }
        }
    }
}
