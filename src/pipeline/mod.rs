//! Ingestion pipeline.
//!
//! - `filter`: per-channel inclusion filters
//! - `fetch`: walk a channel's uploads playlist
//! - `sync`: clear an index and write batches, waiting on each task
//! - `run`: orchestrate collections in configured order

pub mod fetch;
pub mod filter;
pub mod progress;
pub mod run;
pub mod sync;

pub use fetch::{ChannelFetch, ChannelFetcher, FetchStrategy};
pub use filter::{FilterExpr, FilterMode, matches, matches_with};
pub use progress::{NoopObserver, SyncObserver};
pub use run::{RunContext, run};
pub use sync::{CollectionSynchronizer, TaskWait, await_completion};
