// src/pipeline/run.rs

//! Pipeline orchestrator.
//!
//! Walks the configured collections in order. Each enabled collection goes
//! through `Clearing -> Fetching -> Writing -> Done`; a task timeout or task
//! failure marks it `Failed` and the run moves on. Any other error stops the
//! run.

use crate::error::Result;
use crate::models::{
    ChannelConfig, CollectionConfig, CollectionState, Config, RunCounters, SkipReason,
};
use crate::pipeline::fetch::{ChannelFetcher, FetchStrategy};
use crate::pipeline::progress::SyncObserver;
use crate::pipeline::sync::{CollectionSynchronizer, TaskWait};
use crate::services::{SearchBackend, VideoCatalog};

/// Everything a run needs: remote collaborators, settings and an observer.
pub struct RunContext<'a> {
    pub catalog: &'a dyn VideoCatalog,
    pub search: &'a dyn SearchBackend,
    pub config: &'a Config,
    pub observer: &'a dyn SyncObserver,
}

impl<'a> RunContext<'a> {
    pub fn new(
        catalog: &'a dyn VideoCatalog,
        search: &'a dyn SearchBackend,
        config: &'a Config,
        observer: &'a dyn SyncObserver,
    ) -> Self {
        Self {
            catalog,
            search,
            config,
            observer,
        }
    }

    fn skip(&self, collection: &CollectionConfig, reason: SkipReason, counters: &mut RunCounters) {
        log::info!("Skipping collection '{}': {}", collection.key, reason);
        self.observer.collection_skipped(collection, reason);
        self.observer
            .collection_state(collection, CollectionState::Skipped);
        counters.collections_skipped += 1;
    }
}

/// Synchronize every collection in order.
pub async fn run(ctx: &RunContext<'_>, collections: &[CollectionConfig]) -> Result<RunCounters> {
    let mut counters = RunCounters::default();

    for collection in collections {
        if collection.disabled {
            ctx.skip(collection, SkipReason::Disabled, &mut counters);
            continue;
        }

        let channels = collection.enabled_channels();
        if channels.is_empty() {
            ctx.skip(collection, SkipReason::NoEnabledChannels, &mut counters);
            continue;
        }

        match sync_collection(ctx, collection, &channels, &mut counters).await {
            Ok(indexed) => {
                counters.collections_indexed += 1;
                counters.videos_indexed += indexed;
                ctx.observer
                    .collection_state(collection, CollectionState::Done);
            }
            Err(e) if e.is_collection_scoped() => {
                log::warn!("Collection '{}' aborted: {}", collection.key, e);
                ctx.observer.collection_failed(collection, &e);
                ctx.observer
                    .collection_state(collection, CollectionState::Failed);
                counters.collections_failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "Run finished: {} indexed, {} skipped, {} failed, {} API requests",
        counters.collections_indexed,
        counters.collections_skipped,
        counters.collections_failed,
        counters.total_api_calls
    );
    Ok(counters)
}

/// Clear, fetch and write one collection. Returns the number of documents written.
async fn sync_collection(
    ctx: &RunContext<'_>,
    collection: &CollectionConfig,
    channels: &[&ChannelConfig],
    counters: &mut RunCounters,
) -> Result<usize> {
    let settings = &ctx.config.sync;
    let synchronizer = CollectionSynchronizer::new(
        ctx.search,
        settings.batch_size,
        TaskWait::from_config(settings),
        ctx.observer,
    );

    ctx.observer
        .collection_state(collection, CollectionState::Clearing);
    synchronizer.clear(&collection.key).await?;

    ctx.observer
        .collection_state(collection, CollectionState::Fetching);
    let fetcher = ChannelFetcher::new(
        ctx.catalog,
        FetchStrategy::for_collection(collection.index_tags),
        settings.filter_mode,
    );

    let mut videos = Vec::new();
    for (i, channel) in channels.iter().enumerate() {
        ctx.observer.channel_started(channel, i + 1, channels.len());

        let fetch = fetcher.fetch(channel).await?;
        counters.total_api_calls += fetch.api_calls;
        ctx.observer.channel_fetched(&fetch.outcome(channel));
        videos.extend(fetch.videos);
    }

    ctx.observer
        .collection_state(collection, CollectionState::Writing);
    synchronizer.write(&collection.key, &videos).await
}
