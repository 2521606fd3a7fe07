//! Utility functions and helpers.

pub mod console;
pub mod http;

/// Base URL of the public watch page.
const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Watch page URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL}?v={video_id}")
}

/// Number of batches needed to write `total` items.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size.max(1))
}
