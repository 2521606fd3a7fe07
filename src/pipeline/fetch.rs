// src/pipeline/fetch.rs

//! Channel fetching.
//!
//! Resolves a channel to its uploads playlist and walks every page of it.
//! With the `Enriched` strategy each page costs a second call to
//! `videos.list`, the only endpoint that returns tags.

use crate::error::{AppError, Result};
use crate::models::{ChannelConfig, ChannelOutcome, VideoRecord};
use crate::pipeline::filter::{self, FilterExpr, FilterMode};
use crate::services::{PlaylistPage, VideoCatalog};

/// How each playlist page is turned into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Records come straight from the playlist listing, without tags
    Listing,
    /// Each page is looked up again through `videos.list` to get tags
    Enriched,
}

impl FetchStrategy {
    pub fn for_collection(index_tags: bool) -> Self {
        if index_tags {
            Self::Enriched
        } else {
            Self::Listing
        }
    }

    pub fn indexes_tags(self) -> bool {
        self == Self::Enriched
    }

    /// Build records for one page. Returns the records and the extra calls spent.
    async fn page_records(
        self,
        catalog: &dyn VideoCatalog,
        page: &PlaylistPage,
    ) -> Result<(Vec<VideoRecord>, u64)> {
        let mut ids = Vec::with_capacity(page.items.len());
        for item in &page.items {
            match item.video_id() {
                Some(id) => ids.push(id.to_string()),
                None => log::warn!("Skipping playlist item without a video id"),
            }
        }

        match self {
            Self::Listing => {
                let records = page
                    .items
                    .iter()
                    .filter_map(|item| item.video_id().map(|id| item.snippet.to_record(id)))
                    .collect();
                Ok((records, 0))
            }
            Self::Enriched if ids.is_empty() => Ok((Vec::new(), 0)),
            Self::Enriched => {
                let videos = catalog.videos(&ids).await?;
                let records = videos
                    .iter()
                    .map(|video| video.snippet.to_record(&video.id))
                    .collect();
                Ok((records, 1))
            }
        }
    }
}

/// Everything fetched for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFetch {
    /// `None` when the channel does not exist
    pub title: Option<String>,
    pub videos: Vec<VideoRecord>,
    pub api_calls: u64,
}

impl ChannelFetch {
    pub fn outcome(&self, channel: &ChannelConfig) -> ChannelOutcome {
        ChannelOutcome {
            channel_id: channel.id.clone(),
            title: self.title.clone(),
            videos: self.videos.len(),
            api_calls: self.api_calls,
            filters: channel.filters.clone(),
        }
    }
}

/// Fetches and filters the uploads of channels for one collection.
pub struct ChannelFetcher<'a> {
    catalog: &'a dyn VideoCatalog,
    strategy: FetchStrategy,
    mode: FilterMode,
}

impl<'a> ChannelFetcher<'a> {
    pub fn new(catalog: &'a dyn VideoCatalog, strategy: FetchStrategy, mode: FilterMode) -> Self {
        Self {
            catalog,
            strategy,
            mode,
        }
    }

    /// Fetch every upload of a channel that passes its filters.
    pub async fn fetch(&self, channel: &ChannelConfig) -> Result<ChannelFetch> {
        let Some(info) = self.catalog.channel(&channel.id).await? else {
            log::warn!("Channel '{}' does not exist", channel.id);
            return Ok(ChannelFetch::default());
        };

        let filters = FilterExpr::parse_all(&channel.filters);
        let mut title: Option<String> = None;
        let mut videos = Vec::new();
        let mut api_calls = 0;
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .catalog
                .playlist_page(&info.uploads_playlist_id, page_token.as_deref())
                .await;
            api_calls += 1;

            let page = match page {
                Ok(page) => page,
                Err(AppError::PlaylistNotFound(_)) if page_token.is_none() => {
                    log::debug!("Channel '{}' has no uploads", channel.id);
                    break;
                }
                Err(e) => return Err(e),
            };

            if title.is_none() {
                title = page
                    .items
                    .first()
                    .map(|item| item.snippet.channel_title.clone());
            }

            let (records, extra_calls) = self.strategy.page_records(self.catalog, &page).await?;
            api_calls += extra_calls;

            let before = videos.len();
            for record in records {
                if !filter::matches_with(&record, &filters, self.mode) {
                    continue;
                }
                if self.strategy.indexes_tags() {
                    videos.push(record);
                } else {
                    videos.push(record.without_tags());
                }
            }
            log::debug!(
                "Channel '{}': page {} kept {}/{} items",
                channel.id,
                api_calls,
                videos.len() - before,
                page.items.len()
            );

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        Ok(ChannelFetch {
            title: title.or(Some(info.title)),
            videos,
            api_calls,
        })
    }
}
