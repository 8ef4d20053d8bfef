use std::path::PathBuf;

use thiserror::Error;

use crate::provider::ProviderId;

/// Why a provider produced no record.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no API key configured for {provider} (set {env_var})")]
    MissingCredential { provider: ProviderId, env_var: &'static str },

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: ProviderId,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse {provider} JSON: {source}")]
    Json {
        provider: ProviderId,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected {provider} response shape: {reason}")]
    Shape { provider: ProviderId, reason: String },

    #[error("invalid {provider} endpoint '{url}'")]
    InvalidUrl { provider: ProviderId, url: String },
}

/// Why a record could not be appended to its store.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode CSV row for {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
