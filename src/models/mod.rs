// src/models/mod.rs

//! Domain models for the indexer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod collection;
mod config;
mod stats;
mod video;

// Re-export all public types
pub use collection::{ChannelConfig, CollectionConfig};
pub use config::{Config, HttpConfig, MAX_PAGE_SIZE, SearchConfig, SyncConfig, YoutubeConfig};
pub use stats::{ChannelOutcome, CollectionState, RunCounters, SkipReason, SyncProgress};
pub use video::VideoRecord;
