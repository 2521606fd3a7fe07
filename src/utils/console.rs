// src/utils/console.rs

//! Console reporter with server-style formatting.
//!
//! Prints timestamped lines for each collection and channel, and rewrites a
//! single line in place for fetch and write progress.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Local;

use crate::error::AppError;
use crate::models::{
    ChannelConfig, ChannelOutcome, CollectionConfig, CollectionState, RunCounters, SkipReason,
    SyncProgress,
};
use crate::pipeline::SyncObserver;

/// ANSI sequence that erases the current line.
const CLEAR_LINE: &str = "\x1b[2K\r";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Format a message with timestamp and level.
fn format_line(level: Level, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

/// Status line for a fetched channel.
pub fn channel_status(outcome: &ChannelOutcome) -> (Level, String) {
    let Some(title) = &outcome.title else {
        return (
            Level::Error,
            format!("The channel \"{}\" doesn't exist", outcome.channel_id),
        );
    };

    if outcome.videos == 0 {
        return (Level::Warn, format!("{title}: No video found"));
    }

    let filters = match outcome.filters.len() {
        0 => String::new(),
        1 => format!(" (with filter: {})", outcome.filters[0]),
        _ => format!(" (with filters: {})", outcome.filters.join(", ")),
    };
    (
        Level::Info,
        format!("{title}: OK! {} videos{filters}", outcome.videos),
    )
}

/// Prints pipeline events for a human watching the terminal.
#[derive(Debug, Default)]
pub struct Console {
    quiet: bool,
    collections: AtomicUsize,
}

impl Console {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            collections: AtomicUsize::new(0),
        }
    }

    fn print(&self, level: Level, message: &str) {
        if self.quiet {
            return;
        }
        match level {
            Level::Info => println!("{}", format_line(level, message)),
            _ => eprintln!("{}", format_line(level, message)),
        }
    }

    /// Rewrite the current line without a newline.
    fn progress(&self, message: &str) {
        if self.quiet {
            return;
        }
        print!("{CLEAR_LINE}{}", format_line(Level::Info, message));
        let _ = io::stdout().flush();
    }

    fn clear_progress(&self) {
        if !self.quiet {
            print!("{CLEAR_LINE}");
        }
    }

    /// Blank line between collections, then the collection header.
    fn header(&self, collection: &CollectionConfig) {
        if self.quiet {
            return;
        }
        if self.collections.fetch_add(1, Ordering::Relaxed) > 0 {
            println!();
        }
        self.print(
            Level::Info,
            &format!("Indexing {} ({})", collection.display_name, collection.key),
        );
    }

    /// Final summary.
    pub fn summary(&self, counters: &RunCounters, elapsed: Duration) {
        if self.quiet {
            return;
        }
        println!();
        self.print(Level::Info, "[SUMMARY] Run complete");
        let items = [
            ("Collections indexed", counters.collections_indexed.to_string()),
            ("Collections skipped", counters.collections_skipped.to_string()),
            ("Collections failed", counters.collections_failed.to_string()),
            ("Videos indexed", counters.videos_indexed.to_string()),
            ("Elapsed", format!("{:.1}s", elapsed.as_secs_f64())),
        ];
        for (key, value) in items {
            self.print(Level::Info, &format!("    {key}: {value}"));
        }
        self.print(
            Level::Info,
            &format!(
                "You made {} requests to the YouTube API.",
                counters.total_api_calls
            ),
        );
    }
}

impl SyncObserver for Console {
    fn collection_skipped(&self, collection: &CollectionConfig, reason: SkipReason) {
        match reason {
            SkipReason::Disabled => {}
            SkipReason::NoEnabledChannels => {
                self.header(collection);
                let message = format!("{}. Skipping...", capitalize(&reason.to_string()));
                self.print(Level::Warn, &message);
            }
        }
    }

    fn collection_state(&self, collection: &CollectionConfig, state: CollectionState) {
        if state == CollectionState::Clearing {
            self.header(collection);
        }
    }

    fn channel_started(&self, _channel: &ChannelConfig, position: usize, total: usize) {
        self.progress(&format!("Get {position}/{total} channels."));
    }

    fn channel_fetched(&self, outcome: &ChannelOutcome) {
        self.clear_progress();
        let (level, message) = channel_status(outcome);
        self.print(level, &format!("    {message}"));
    }

    fn batch_written(&self, _index_uid: &str, progress: SyncProgress) {
        self.progress(&format!("{}/{} indexed.", progress.written, progress.total));
        if progress.written == progress.total && !self.quiet {
            println!();
        }
    }

    fn collection_failed(&self, collection: &CollectionConfig, error: &AppError) {
        self.clear_progress();
        self.print(
            Level::Error,
            &format!("Collection '{}' aborted: {}", collection.key, error),
        );
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
