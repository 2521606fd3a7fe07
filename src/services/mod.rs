//! Remote service clients for the indexer.
//!
//! Two collaborators sit behind traits so the pipeline can run against
//! in-memory fakes:
//! - `VideoCatalog`: the YouTube Data API (`YoutubeClient`)
//! - `SearchBackend`: the Meilisearch document store (`MeiliClient`)

pub mod meilisearch;
pub mod youtube;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::VideoRecord;

pub use meilisearch::{MeiliClient, Task, TaskInfo, TaskStatus};
pub use youtube::{ChannelInfo, PlaylistPage, Video, YoutubeClient};

/// Identifier of an asynchronous task in the search service.
pub type TaskUid = u64;

/// Read access to channel uploads.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Resolve a channel to its uploads playlist. `None` if the channel is unknown.
    async fn channel(&self, channel_id: &str) -> Result<Option<ChannelInfo>>;

    /// Fetch one page of a playlist.
    async fn playlist_page(&self, playlist_id: &str, page_token: Option<&str>)
    -> Result<PlaylistPage>;

    /// Fetch full video resources (including tags) for up to one page of ids.
    async fn videos(&self, ids: &[String]) -> Result<Vec<Video>>;
}

/// Write access to search indexes.
///
/// Every mutation is asynchronous on the server side and returns the uid of
/// the task to wait for.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Create the index if needed. Returns the creation task, if one was started.
    async fn ensure_index(&self, index_uid: &str) -> Result<Option<TaskUid>>;

    /// Remove every document from the index.
    async fn delete_all_documents(&self, index_uid: &str) -> Result<TaskUid>;

    /// Add or replace a batch of documents.
    async fn add_documents(&self, index_uid: &str, documents: &[VideoRecord]) -> Result<TaskUid>;

    /// Current state of a task.
    async fn task(&self, task_uid: TaskUid) -> Result<Task>;
}
