// src/pipeline/filter.rs

//! Channel filter expressions.
//!
//! A filter is `title:<term>`, `tags:<term>` or a bare `<term>` (title and
//! tags). Titles match on a case-insensitive substring, tags on a
//! case-insensitive exact value.
//!
//! ## Combining filters
//!
//! `FilterMode::Last` is the historical behavior: one running flag starting
//! at `true` is overwritten by every title check and every tag comparison,
//! and whatever the last comparison produced decides. A tag check over a video
//! without tags leaves the flag as it was. `All` and `Any` give
//! conjunction and disjunction instead.

use serde::{Deserialize, Serialize};

use crate::models::VideoRecord;

/// How the expressions of one channel combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Result of the last comparison evaluated
    #[default]
    Last,
    /// Every expression must match
    All,
    /// At least one expression must match
    Any,
}

/// Which fields an expression looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Title,
    Tags,
    Both,
}

/// A parsed, lower-cased filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    pub field: FilterField,
    pub term: String,
}

impl FilterExpr {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        let field = if lowered.starts_with("title:") {
            FilterField::Title
        } else if lowered.starts_with("tags:") {
            FilterField::Tags
        } else {
            FilterField::Both
        };

        let term = match field {
            FilterField::Both => lowered,
            _ => lowered
                .split_once(':')
                .map(|(_, term)| term.to_string())
                .unwrap_or_default(),
        };

        Self { field, term }
    }

    pub fn parse_all(raw: &[String]) -> Vec<Self> {
        raw.iter().map(|f| Self::parse(f)).collect()
    }

    fn checks_title(&self) -> bool {
        matches!(self.field, FilterField::Title | FilterField::Both)
    }

    fn checks_tags(&self) -> bool {
        matches!(self.field, FilterField::Tags | FilterField::Both)
    }

    fn title_matches(&self, title: &str) -> bool {
        title.contains(&self.term)
    }

    fn tag_matches(&self, tag: &str) -> bool {
        tag.to_lowercase() == self.term
    }

    /// Standalone result for this expression: title OR tags.
    pub fn matches(&self, video: &VideoRecord) -> bool {
        let title = video.title.to_lowercase();
        (self.checks_title() && self.title_matches(&title))
            || (self.checks_tags() && video.tag_list().iter().any(|t| self.tag_matches(t)))
    }
}

/// Whether a video passes the raw filter strings of a channel (default mode).
pub fn matches(video: &VideoRecord, filters: &[String]) -> bool {
    matches_with(video, &FilterExpr::parse_all(filters), FilterMode::Last)
}

/// Whether a video passes parsed filters under the given mode.
pub fn matches_with(video: &VideoRecord, filters: &[FilterExpr], mode: FilterMode) -> bool {
    if filters.is_empty() {
        return true;
    }

    match mode {
        FilterMode::Last => last_match(video, filters),
        FilterMode::All => filters.iter().all(|f| f.matches(video)),
        FilterMode::Any => filters.iter().any(|f| f.matches(video)),
    }
}

fn last_match(video: &VideoRecord, filters: &[FilterExpr]) -> bool {
    let title = video.title.to_lowercase();
    let mut found = true;

    for filter in filters {
        if filter.checks_title() {
            found = filter.title_matches(&title);
        }
        if filter.checks_tags() {
            for tag in video.tag_list() {
                found = filter.tag_matches(tag);
                if found {
                    break;
                }
            }
        }
    }

    found
}
