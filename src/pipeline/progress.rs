//! Progress notifications emitted while a run is in flight.

use crate::error::AppError;
use crate::models::{
    ChannelConfig, ChannelOutcome, CollectionConfig, CollectionState, SkipReason, SyncProgress,
};

/// Receives pipeline events. Every method defaults to doing nothing.
pub trait SyncObserver: Send + Sync {
    fn collection_skipped(&self, _collection: &CollectionConfig, _reason: SkipReason) {}

    fn collection_state(&self, _collection: &CollectionConfig, _state: CollectionState) {}

    fn channel_started(&self, _channel: &ChannelConfig, _position: usize, _total: usize) {}

    fn channel_fetched(&self, _outcome: &ChannelOutcome) {}

    fn batch_written(&self, _index_uid: &str, _progress: SyncProgress) {}

    fn collection_failed(&self, _collection: &CollectionConfig, _error: &AppError) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
