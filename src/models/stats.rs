//! Run counters and per-unit outcomes reported to the CLI.

use std::fmt;

use serde::Serialize;

/// Counters accumulated over one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    /// Calls made to the YouTube API (listing and enrichment)
    pub total_api_calls: u64,
    pub collections_indexed: usize,
    pub collections_skipped: usize,
    pub collections_failed: usize,
    pub videos_indexed: usize,
}

/// Result of fetching a single channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelOutcome {
    pub channel_id: String,
    /// `None` when the channel does not exist
    pub title: Option<String>,
    pub videos: usize,
    pub api_calls: u64,
    pub filters: Vec<String>,
}

impl ChannelOutcome {
    pub fn is_unknown(&self) -> bool {
        self.title.is_none()
    }
}

/// Why a collection was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    Disabled,
    NoEnabledChannels,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "collection disabled"),
            SkipReason::NoEnabledChannels => {
                write!(f, "no channels found, or they are all disabled")
            }
        }
    }
}

/// Lifecycle of a collection during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollectionState {
    Skipped,
    Clearing,
    Fetching,
    Writing,
    Done,
    Failed,
}

/// Running total of documents acknowledged by the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncProgress {
    pub written: usize,
    pub total: usize,
}
