//! Video document data structure.

use serde::{Deserialize, Serialize};

/// A video document as stored in a search index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    /// YouTube video id, also the index primary key
    pub id: String,

    /// Display title of the uploading channel
    pub channel_title: String,

    /// Publication timestamp (ISO 8601)
    pub published_date: String,

    /// Video title
    pub title: String,

    /// Video description
    pub description: String,

    /// Video tags, only present when the collection indexes tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Watch page URL
    pub link: String,

    /// Thumbnail URL
    pub thumbnail: String,
}

impl VideoRecord {
    /// Tags as a slice; empty when tags are not indexed.
    pub fn tag_list(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// Drop the tags so the document matches an index without tag data.
    pub fn without_tags(mut self) -> Self {
        self.tags = None;
        self
    }
}
