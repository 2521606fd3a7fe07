// src/pipeline/sync.rs

//! Collection synchronization: clear an index, then refill it in batches.
//!
//! Every mutation is enqueued by the search service and must be acknowledged
//! before the next one is issued.

use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::error::{AppError, Result};
use crate::models::{SyncConfig, SyncProgress, VideoRecord};
use crate::pipeline::progress::SyncObserver;
use crate::services::{SearchBackend, Task, TaskStatus, TaskUid};
use crate::utils::batch_count;

/// Bounds for waiting on a search task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskWait {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl TaskWait {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            timeout: config.task_timeout(),
            poll_interval: config.task_poll_interval(),
        }
    }
}

impl Default for TaskWait {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

/// Poll a task until it reaches a final state.
///
/// Fails with `TaskTimeout` when the deadline passes and with `TaskFailed`
/// when the task ends in any state other than succeeded.
pub async fn await_completion(
    backend: &dyn SearchBackend,
    index_uid: &str,
    task_uid: TaskUid,
    wait: TaskWait,
) -> Result<Task> {
    let started = Instant::now();

    loop {
        let task = backend.task(task_uid).await?;
        match task.status {
            TaskStatus::Succeeded => return Ok(task),
            status if status.is_finished() => {
                return Err(AppError::TaskFailed {
                    index: index_uid.to_string(),
                    task: task_uid,
                    message: task.failure_message(),
                });
            }
            _ => {}
        }

        let waited = started.elapsed();
        if waited >= wait.timeout {
            return Err(AppError::TaskTimeout {
                index: index_uid.to_string(),
                task: task_uid,
                waited_ms: waited.as_millis(),
            });
        }
        sleep(wait.poll_interval.min(wait.timeout - waited)).await;
    }
}

/// Replaces the content of one index with a new set of records.
pub struct CollectionSynchronizer<'a> {
    backend: &'a dyn SearchBackend,
    batch_size: usize,
    wait: TaskWait,
    observer: &'a dyn SyncObserver,
}

impl<'a> CollectionSynchronizer<'a> {
    pub fn new(
        backend: &'a dyn SearchBackend,
        batch_size: usize,
        wait: TaskWait,
        observer: &'a dyn SyncObserver,
    ) -> Self {
        Self {
            backend,
            batch_size: batch_size.max(1),
            wait,
            observer,
        }
    }

    /// Create the index if needed and remove every document from it.
    pub async fn clear(&self, index_uid: &str) -> Result<()> {
        if let Some(task) = self.backend.ensure_index(index_uid).await? {
            await_completion(self.backend, index_uid, task, self.wait).await?;
        }

        let task = self.backend.delete_all_documents(index_uid).await?;
        await_completion(self.backend, index_uid, task, self.wait).await?;
        log::info!("Cleared index '{}'", index_uid);
        Ok(())
    }

    /// Write records in order, one acknowledged batch at a time.
    pub async fn write(&self, index_uid: &str, videos: &[VideoRecord]) -> Result<usize> {
        let total = videos.len();
        let mut written = 0;
        log::debug!(
            "Writing {} documents to '{}' in {} batches",
            total,
            index_uid,
            batch_count(total, self.batch_size)
        );

        for batch in videos.chunks(self.batch_size) {
            let task = self.backend.add_documents(index_uid, batch).await?;
            await_completion(self.backend, index_uid, task, self.wait).await?;

            written += batch.len();
            self.observer
                .batch_written(index_uid, SyncProgress { written, total });
        }

        log::info!("Indexed {} documents into '{}'", written, index_uid);
        Ok(written)
    }

    /// Clear the index, then write all records.
    pub async fn sync(&self, index_uid: &str, videos: &[VideoRecord]) -> Result<usize> {
        self.clear(index_uid).await?;
        self.write(index_uid, videos).await
    }
}
