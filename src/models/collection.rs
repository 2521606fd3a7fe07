// src/models/collection.rs

//! Collection and channel definitions read from the channel file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One YouTube channel feeding a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel identifier (e.g., "UC_x5XG1OV2P6uZZ5FSM9Ttw")
    pub id: String,

    /// Filter expressions (`title:<term>`, `tags:<term>` or `<term>`)
    #[serde(default)]
    pub filters: Vec<String>,

    /// Skip this channel without removing it from the file
    #[serde(default)]
    pub disabled: bool,
}

impl ChannelConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filters: Vec::new(),
            disabled: false,
        }
    }

    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }
}

/// Raw table shape of a collection in the channel file.
#[derive(Debug, Deserialize)]
struct CollectionEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tags: bool,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    channels: Vec<ChannelConfig>,
}

/// A target search index and the channels that populate it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollectionConfig {
    /// Index uid in the search service
    pub key: String,

    /// Human-readable name, defaults to the key
    pub display_name: String,

    /// Fetch and store video tags (one extra API call per page)
    pub index_tags: bool,

    /// Skip the whole collection
    pub disabled: bool,

    /// Channels in configured order
    pub channels: Vec<ChannelConfig>,
}

impl CollectionConfig {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            display_name: key.clone(),
            key,
            index_tags: false,
            disabled: false,
            channels: Vec::new(),
        }
    }

    pub fn with_channels(mut self, channels: Vec<ChannelConfig>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_tags(mut self, index_tags: bool) -> Self {
        self.index_tags = index_tags;
        self
    }

    fn from_entry(key: String, entry: CollectionEntry) -> Self {
        Self {
            display_name: entry.name.unwrap_or_else(|| key.clone()),
            key,
            index_tags: entry.tags,
            disabled: entry.disabled,
            channels: entry.channels,
        }
    }

    /// Load every collection from a channel file, keeping file order.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Cannot read channel file {}: {e}", path.display()))
        })?;
        Self::parse_all(&content)
    }

    /// Parse collections from channel file contents.
    pub fn parse_all(content: &str) -> Result<Vec<Self>> {
        let table: toml::Table = toml::from_str(content)?;

        table
            .into_iter()
            .map(|(key, value)| {
                validate_key(&key)?;
                let entry: CollectionEntry = value
                    .try_into()
                    .map_err(|e| AppError::config(format!("Collection '{key}': {e}")))?;
                Ok(Self::from_entry(key, entry))
            })
            .collect()
    }

    /// Channels that are not individually disabled.
    pub fn enabled_channels(&self) -> Vec<&ChannelConfig> {
        self.channels.iter().filter(|c| !c.disabled).collect()
    }
}

/// Index uids are limited to ASCII letters, digits, `-` and `_`.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::config(format!(
            "Collection '{key}': the key must only contain letters, digits, '-' and '_'"
        )))
    }
}
