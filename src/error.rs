// src/error.rs

//! Unified error handling for the indexer.

use std::fmt;

use thiserror::Error;

/// Result type alias for indexer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The YouTube API rejected the key
    #[error("The provided YouTube API key is not valid: {0}")]
    Auth(String),

    /// A playlist does not exist (YouTube reports empty uploads playlists this way)
    #[error("YouTube playlist not found: {0}")]
    PlaylistNotFound(String),

    /// The search service could not be reached
    #[error("No Meilisearch server is reachable at \"{address}\": {message}")]
    Connectivity { address: String, message: String },

    /// A remote API answered with a non-success status
    #[error("{service} API error (HTTP {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// A pending search task did not finish in time
    #[error("Index '{index}': task {task} still pending after {waited_ms}ms")]
    TaskTimeout {
        index: String,
        task: u64,
        waited_ms: u128,
    },

    /// A search task finished without being applied
    #[error("Index '{index}': task {task} failed: {message}")]
    TaskFailed {
        index: String,
        task: u64,
        message: String,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a connectivity error for the given search service address.
    pub fn connectivity(address: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Connectivity {
            address: address.into(),
            message: message.to_string(),
        }
    }

    /// Create an error for a non-success API response.
    pub fn api(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            service,
            status,
            message: message.into(),
        }
    }

    /// Errors that abort a single collection while the run continues.
    pub fn is_collection_scoped(&self) -> bool {
        matches!(self, Self::TaskTimeout { .. } | Self::TaskFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_errors_are_collection_scoped() {
        let timeout = AppError::TaskTimeout {
            index: "videos".into(),
            task: 3,
            waited_ms: 20_000,
        };
        let failed = AppError::TaskFailed {
            index: "videos".into(),
            task: 4,
            message: "invalid document id".into(),
        };
        assert!(timeout.is_collection_scoped());
        assert!(failed.is_collection_scoped());
        assert!(timeout.to_string().contains("videos"));
    }

    #[test]
    fn remote_failures_are_fatal() {
        assert!(!AppError::Auth("keyInvalid".into()).is_collection_scoped());
        assert!(!AppError::connectivity("http://x", "refused").is_collection_scoped());
        assert!(!AppError::api("YouTube", 403, "quotaExceeded").is_collection_scoped());
        assert!(!AppError::PlaylistNotFound("UU1".into()).is_collection_scoped());
    }
}
