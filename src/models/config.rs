//! Application settings structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::pipeline::FilterMode;

/// Maximum page size accepted by the YouTube Data API.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Root application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client settings shared by both remote services
    #[serde(default)]
    pub http: HttpConfig,

    /// YouTube Data API settings
    #[serde(default)]
    pub youtube: YoutubeConfig,

    /// Meilisearch connection settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Batching, task polling and filtering behavior
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Config {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate settings values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.youtube.page_size == 0 || self.youtube.page_size > MAX_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "youtube.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.search.url.trim().is_empty() {
            return Err(AppError::validation("search.url is empty"));
        }
        if self.sync.batch_size == 0 {
            return Err(AppError::validation("sync.batch_size must be > 0"));
        }
        if self.sync.task_poll_interval_ms == 0 {
            return Err(AppError::validation(
                "sync.task_poll_interval_ms must be > 0",
            ));
        }
        if self.sync.task_timeout_ms < self.sync.task_poll_interval_ms {
            return Err(AppError::validation(
                "sync.task_timeout_ms must be >= sync.task_poll_interval_ms",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    /// Base URL of the Data API v3
    #[serde(default = "defaults::youtube_api_url")]
    pub api_url: String,

    /// Playlist items requested per page (at most 50)
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::youtube_api_url(),
            page_size: defaults::page_size(),
        }
    }
}

/// Meilisearch connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Address of the Meilisearch server
    #[serde(default = "defaults::search_url")]
    pub url: String,

    /// Master or API key, sent as a bearer token
    #[serde(default)]
    pub master_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: defaults::search_url(),
            master_key: None,
        }
    }
}

/// Write batching and task polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Documents per add-documents call
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// How long to wait for a task to be applied
    #[serde(default = "defaults::task_timeout")]
    pub task_timeout_ms: u64,

    /// Delay between task status checks
    #[serde(default = "defaults::task_poll_interval")]
    pub task_poll_interval_ms: u64,

    /// How multiple channel filters combine
    #[serde(default)]
    pub filter_mode: FilterMode,
}

impl SyncConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }

    pub fn task_poll_interval(&self) -> Duration {
        Duration::from_millis(self.task_poll_interval_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::batch_size(),
            task_timeout_ms: defaults::task_timeout(),
            task_poll_interval_ms: defaults::task_poll_interval(),
            filter_mode: FilterMode::default(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        concat!("tube-indexer/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // YouTube defaults
    pub fn youtube_api_url() -> String {
        "https://www.googleapis.com/youtube/v3".into()
    }
    pub fn page_size() -> u32 {
        super::MAX_PAGE_SIZE
    }

    // Search defaults
    pub fn search_url() -> String {
        "http://127.0.0.1:7700".into()
    }

    // Sync defaults
    pub fn batch_size() -> usize {
        100
    }
    pub fn task_timeout() -> u64 {
        20_000
    }
    pub fn task_poll_interval() -> u64 {
        200
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_oversized_pages() {
        let mut config = Config::default();
        config.youtube.page_size = 51;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.sync.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_timeout_below_poll_interval() {
        let mut config = Config::default();
        config.sync.task_timeout_ms = 10;
        config.sync.task_poll_interval_ms = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_rejects_unknown_filter_mode() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[sync]\nfilter_mode = \"al\"\n").unwrap();
        assert!(matches!(Config::load(file.path()), Err(AppError::Toml(_))));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[sync]\nbatch_size = 25\nfilter_mode = \"all\"\n\n[search]\nurl = \"http://meili:7700\"\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sync.batch_size, 25);
        assert_eq!(config.sync.filter_mode, FilterMode::All);
        assert_eq!(config.sync.task_timeout_ms, 20_000);
        assert_eq!(config.search.url, "http://meili:7700");
        assert_eq!(config.youtube.page_size, 50);
    }
}
