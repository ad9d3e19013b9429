//! Typed errors at the crate's outer seams (HTTP fetch, configuration).
//!
//! Everything inside the pipeline uses `anyhow::Result` with context; these
//! types exist where callers need to match on the failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request to {url} failed")]
    Http {
        url: String,
        /// Stripped of its URL, which may carry a pre-signed token
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("no source registered for {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON config is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
