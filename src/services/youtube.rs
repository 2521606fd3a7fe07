// src/services/youtube.rs

//! YouTube Data API v3 client.
//!
//! Only the three read endpoints the indexer needs are wrapped:
//! `channels.list`, `playlistItems.list` and `videos.list`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, VideoRecord};
use crate::services::VideoCatalog;
use crate::utils::{http, watch_url};

const SERVICE: &str = "YouTube";

/// Error reasons that mean the key itself was rejected.
const AUTH_REASONS: &[&str] = &["keyInvalid", "keyExpired", "API_KEY_INVALID"];

/// Reason given for a missing playlist, which includes an empty uploads playlist.
const PLAYLIST_NOT_FOUND: &str = "playlistNotFound";

/// A resolved channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub title: String,
    pub uploads_playlist_id: String,
}

/// `channels.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    id: String,
    #[serde(default)]
    snippet: Option<ChannelSnippet>,
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

impl From<ChannelResource> for ChannelInfo {
    fn from(resource: ChannelResource) -> Self {
        Self {
            id: resource.id,
            title: resource.snippet.map(|s| s.title).unwrap_or_default(),
            uploads_playlist_id: resource.content_details.related_playlists.uploads,
        }
    }
}

/// `playlistItems.list` response: one page of a playlist.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,

    /// Cursor for the next page, absent on the last one
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A playlist entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub snippet: Snippet,
}

impl PlaylistItem {
    /// Id of the video this entry points to.
    pub fn video_id(&self) -> Option<&str> {
        self.snippet
            .resource_id
            .as_ref()
            .and_then(|r| r.video_id.as_deref())
    }
}

/// `videos.list` response.
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<Video>,
}

/// A video resource with its full snippet.
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub id: String,
    pub snippet: Snippet,
}

/// Snippet payload shared by playlist items and videos.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Only returned by `videos.list`
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// Only returned by `playlistItems.list`
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
}

impl Snippet {
    /// Build the indexed document for the given video id.
    ///
    /// Tags are always present here; callers strip them when the collection
    /// does not index tags.
    pub fn to_record(&self, video_id: &str) -> VideoRecord {
        VideoRecord {
            id: video_id.to_string(),
            channel_title: self.channel_title.clone(),
            published_date: self.published_at.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            tags: Some(self.tags.clone().unwrap_or_default()),
            link: watch_url(video_id),
            thumbnail: self.thumbnails.best_url().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// High resolution first, then smaller ones; empty when none is set.
    pub fn best_url(&self) -> &str {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .next()
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
    #[serde(default)]
    details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: String,
}

/// Map a failed response to an application error.
fn classify_error(status: u16, body: &str) -> AppError {
    let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) else {
        return AppError::api(SERVICE, status, body.trim());
    };

    let error = parsed.error;
    let key_rejected = error
        .errors
        .iter()
        .chain(&error.details)
        .any(|detail| AUTH_REASONS.contains(&detail.reason.as_str()))
        || error.message.contains("API key not valid");

    let playlist_missing = error
        .errors
        .iter()
        .chain(&error.details)
        .any(|detail| detail.reason == PLAYLIST_NOT_FOUND);

    if key_rejected {
        AppError::Auth(error.message)
    } else if playlist_missing {
        AppError::PlaylistNotFound(error.message)
    } else {
        AppError::api(SERVICE, status, error.message)
    }
}

/// Client for the YouTube Data API authenticated with an API key.
pub struct YoutubeClient {
    client: Client,
    api_url: String,
    api_key: String,
    page_size: u32,
}

impl YoutubeClient {
    /// Create a client from settings and an API key.
    pub fn new(config: &Config, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http::create_client(&config.http)?,
            api_url: config.youtube.api_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            page_size: config.youtube.page_size,
        })
    }

    /// Full request URL for an endpoint, with the key appended.
    fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{}/{}", self.api_url, endpoint);
        let query = params
            .iter()
            .copied()
            .chain([("key", self.api_key.as_str())]);
        Ok(Url::parse_with_params(&base, query)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.endpoint_url(endpoint, params)?;
        log::debug!("YouTube API: {} {:?}", endpoint, params);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }
}

#[async_trait]
impl VideoCatalog for YoutubeClient {
    async fn channel(&self, channel_id: &str) -> Result<Option<ChannelInfo>> {
        let response: ChannelListResponse = self
            .get_json(
                "channels",
                &[("part", "snippet,contentDetails"), ("id", channel_id)],
            )
            .await?;

        Ok(response.items.into_iter().next().map(ChannelInfo::from))
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage> {
        let max_results = self.page_size.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        self.get_json("playlistItems", &params).await
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<Video>> {
        let joined = ids.join(",");
        let response: VideoListResponse = self
            .get_json("videos", &[("part", "snippet"), ("id", joined.as_str())])
            .await?;

        Ok(response.items)
    }
}
