//! In-memory stand-ins for the remote services, used by unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{
    ChannelConfig, ChannelOutcome, CollectionConfig, CollectionState, SkipReason, SyncProgress,
    VideoRecord,
};
use crate::pipeline::SyncObserver;
use crate::services::youtube::{PlaylistItem, ResourceId, Snippet, Thumbnail, Thumbnails};
use crate::services::{
    ChannelInfo, PlaylistPage, SearchBackend, Task, TaskStatus, TaskUid, Video, VideoCatalog,
};
use crate::utils::watch_url;

/// A video as the fake catalog serves it.
#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
}

impl FakeVideo {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    fn snippet(&self, channel_title: &str) -> Snippet {
        Snippet {
            channel_title: channel_title.to_string(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            title: self.title.clone(),
            description: format!("About {}", self.title),
            tags: None,
            thumbnails: Thumbnails {
                high: Some(Thumbnail {
                    url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.id),
                }),
                ..Thumbnails::default()
            },
            resource_id: None,
        }
    }
}

struct FakeChannel {
    info: ChannelInfo,
    pages: Vec<Vec<FakeVideo>>,
}

/// Catalog backed by fixed channels. Page tokens are page indexes.
#[derive(Default)]
pub struct FakeCatalog {
    channels: HashMap<String, FakeChannel>,
    missing_playlists: Vec<String>,
    invalid_key: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(
        mut self,
        channel_id: &str,
        title: &str,
        pages: Vec<Vec<FakeVideo>>,
    ) -> Self {
        let info = ChannelInfo {
            id: channel_id.to_string(),
            title: title.to_string(),
            uploads_playlist_id: format!("UU{channel_id}"),
        };
        self.channels
            .insert(channel_id.to_string(), FakeChannel { info, pages });
        self
    }

    /// Channel titled `"<id> title"` whose videos are `"<id>-<n>"`, tagged `"tag-<n>"`.
    pub fn with_numbered_channel(self, channel_id: &str, page_sizes: &[usize]) -> Self {
        let mut n = 0;
        let pages = page_sizes
            .iter()
            .map(|&size| {
                (0..size)
                    .map(|_| {
                        let id = format!("{channel_id}-{n}");
                        let tag = format!("tag-{n}");
                        n += 1;
                        FakeVideo::new(&id, &format!("Video {id}")).with_tags(&[tag.as_str()])
                    })
                    .collect()
            })
            .collect();
        let title = format!("{channel_id} title");
        self.with_channel(channel_id, &title, pages)
    }

    /// Channel whose uploads playlist answers `playlistNotFound`, as YouTube
    /// does for channels that never uploaded.
    pub fn with_missing_playlist(mut self, channel_id: &str, title: &str) -> Self {
        self.missing_playlists.push(format!("UU{channel_id}"));
        self.with_channel(channel_id, title, Vec::new())
    }

    /// Every call fails as if the API key were rejected.
    pub fn with_invalid_key(mut self) -> Self {
        self.invalid_key = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls to an endpoint (`channels`, `playlistItems`, `videos`).
    pub fn count(&self, endpoint: &str) -> usize {
        count_calls(&self.calls(), endpoint)
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.invalid_key {
            return Err(AppError::Auth("API key not valid".to_string()));
        }
        Ok(())
    }

    fn by_playlist(&self, playlist_id: &str) -> Option<&FakeChannel> {
        self.channels
            .values()
            .find(|c| c.info.uploads_playlist_id == playlist_id)
    }

    fn find_video(&self, id: &str) -> Option<(&FakeChannel, &FakeVideo)> {
        self.channels.values().find_map(|channel| {
            channel
                .pages
                .iter()
                .flatten()
                .find(|v| v.id == id)
                .map(|v| (channel, v))
        })
    }
}

#[async_trait]
impl VideoCatalog for FakeCatalog {
    async fn channel(&self, channel_id: &str) -> Result<Option<ChannelInfo>> {
        self.record(format!("channels:{channel_id}"))?;
        Ok(self.channels.get(channel_id).map(|c| c.info.clone()))
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage> {
        let index: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        self.record(format!("playlistItems:{playlist_id}:{index}"))?;
        if self.missing_playlists.iter().any(|p| p == playlist_id) {
            return Err(AppError::PlaylistNotFound(playlist_id.to_string()));
        }

        let Some(channel) = self.by_playlist(playlist_id) else {
            return Err(AppError::api("YouTube", 404, "playlist not found"));
        };
        let items = channel
            .pages
            .get(index)
            .map(|videos| {
                videos
                    .iter()
                    .map(|v| {
                        let mut snippet = v.snippet(&channel.info.title);
                        snippet.resource_id = Some(ResourceId {
                            video_id: Some(v.id.clone()),
                        });
                        PlaylistItem { snippet }
                    })
                    .collect()
            })
            .unwrap_or_default();
        let next_page_token = (index + 1 < channel.pages.len()).then(|| (index + 1).to_string());

        Ok(PlaylistPage {
            items,
            next_page_token,
        })
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<Video>> {
        self.record(format!("videos:{}", ids.len()))?;
        Ok(ids
            .iter()
            .filter_map(|id| self.find_video(id))
            .map(|(channel, v)| {
                let mut snippet = v.snippet(&channel.info.title);
                snippet.tags = Some(v.tags.clone());
                Video {
                    id: v.id.clone(),
                    snippet,
                }
            })
            .collect())
    }
}

struct FakeTask {
    index: String,
    polls_left: u32,
    status: TaskStatus,
}

#[derive(Default)]
struct SearchState {
    indexes: BTreeMap<String, Vec<VideoRecord>>,
    batches: HashMap<String, Vec<usize>>,
    tasks: HashMap<TaskUid, FakeTask>,
    next_task: TaskUid,
    calls: Vec<String>,
}

/// Search backend holding indexes in memory. Writes apply when enqueued.
#[derive(Default)]
pub struct FakeSearch {
    state: Mutex<SearchState>,
    pending_polls: u32,
    stuck_index: Option<String>,
    failing_index: Option<String>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks report `enqueued` this many times before finishing.
    pub fn with_pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Tasks on this index never finish.
    pub fn with_stuck_index(mut self, index_uid: &str) -> Self {
        self.stuck_index = Some(index_uid.to_string());
        self
    }

    /// Tasks on this index end as failed and change nothing.
    pub fn with_failing_index(mut self, index_uid: &str) -> Self {
        self.failing_index = Some(index_uid.to_string());
        self
    }

    /// Calls in order, as `op:argument`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls of one kind (`ensure`, `create`, `delete`, `add`, `task`).
    pub fn count(&self, op: &str) -> usize {
        count_calls(&self.calls(), op)
    }

    pub fn documents(&self, index_uid: &str) -> Vec<VideoRecord> {
        let state = self.state.lock().unwrap();
        state.indexes.get(index_uid).cloned().unwrap_or_default()
    }

    pub fn batch_sizes(&self, index_uid: &str) -> Vec<usize> {
        let state = self.state.lock().unwrap();
        state.batches.get(index_uid).cloned().unwrap_or_default()
    }

    fn fails(&self, index_uid: &str) -> bool {
        self.failing_index.as_deref() == Some(index_uid)
    }

    fn enqueue(&self, state: &mut SearchState, index_uid: &str) -> TaskUid {
        state.next_task += 1;
        let status = if self.fails(index_uid) {
            TaskStatus::Failed
        } else {
            TaskStatus::Succeeded
        };
        state.tasks.insert(
            state.next_task,
            FakeTask {
                index: index_uid.to_string(),
                polls_left: self.pending_polls,
                status,
            },
        );
        state.next_task
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn ensure_index(&self, index_uid: &str) -> Result<Option<TaskUid>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("ensure:{index_uid}"));
        if state.indexes.contains_key(index_uid) {
            return Ok(None);
        }

        state.calls.push(format!("create:{index_uid}"));
        if !self.fails(index_uid) {
            state.indexes.insert(index_uid.to_string(), Vec::new());
        }
        Ok(Some(self.enqueue(&mut state, index_uid)))
    }

    async fn delete_all_documents(&self, index_uid: &str) -> Result<TaskUid> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete:{index_uid}"));
        if !self.fails(index_uid) {
            state.indexes.insert(index_uid.to_string(), Vec::new());
        }
        Ok(self.enqueue(&mut state, index_uid))
    }

    async fn add_documents(&self, index_uid: &str, documents: &[VideoRecord]) -> Result<TaskUid> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("add:{index_uid}"));
        state
            .batches
            .entry(index_uid.to_string())
            .or_default()
            .push(documents.len());

        if !self.fails(index_uid) {
            let stored = state.indexes.entry(index_uid.to_string()).or_default();
            for doc in documents {
                match stored.iter_mut().find(|d| d.id == doc.id) {
                    Some(existing) => *existing = doc.clone(),
                    None => stored.push(doc.clone()),
                }
            }
        }
        Ok(self.enqueue(&mut state, index_uid))
    }

    async fn task(&self, task_uid: TaskUid) -> Result<Task> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("task:{task_uid}"));
        let Some(task) = state.tasks.get_mut(&task_uid) else {
            return Err(AppError::api("Meilisearch", 404, "task not found"));
        };
        let status = if self.stuck_index.as_deref() == Some(task.index.as_str()) {
            TaskStatus::Processing
        } else if task.polls_left > 0 {
            task.polls_left -= 1;
            TaskStatus::Enqueued
        } else {
            task.status
        };

        Ok(Task {
            uid: task_uid,
            status,
            error: None,
        })
    }
}

/// Observer that records every event as a `kind:subject:detail` line.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_with(&self, prefix: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl SyncObserver for RecordingObserver {
    fn collection_skipped(&self, collection: &CollectionConfig, reason: SkipReason) {
        self.push(format!("skipped:{}:{}", collection.key, reason));
    }

    fn collection_state(&self, collection: &CollectionConfig, state: CollectionState) {
        self.push(format!("state:{}:{:?}", collection.key, state));
    }

    fn channel_started(&self, channel: &ChannelConfig, position: usize, total: usize) {
        self.push(format!("channel:{}:{}/{}", channel.id, position, total));
    }

    fn channel_fetched(&self, outcome: &ChannelOutcome) {
        let detail = if outcome.is_unknown() {
            "unknown".to_string()
        } else {
            outcome.videos.to_string()
        };
        self.push(format!("fetched:{}:{}", outcome.channel_id, detail));
    }

    fn batch_written(&self, index_uid: &str, progress: SyncProgress) {
        self.push(format!(
            "batch:{}:{}/{}",
            index_uid, progress.written, progress.total
        ));
    }

    fn collection_failed(&self, collection: &CollectionConfig, _error: &AppError) {
        self.push(format!("failed:{}", collection.key));
    }
}

/// `count` records with ids `"<prefix>-<n>"`.
pub fn numbered_records(prefix: &str, count: usize) -> Vec<VideoRecord> {
    (0..count)
        .map(|n| {
            let id = format!("{prefix}-{n}");
            VideoRecord {
                channel_title: "Channel".to_string(),
                published_date: "2024-01-01T00:00:00Z".to_string(),
                title: format!("Video {n}"),
                description: String::new(),
                tags: None,
                link: watch_url(&id),
                thumbnail: String::new(),
                id,
            }
        })
        .collect()
}

fn count_calls(calls: &[String], op: &str) -> usize {
    calls
        .iter()
        .filter(|c| c.split(':').next() == Some(op))
        .count()
}
