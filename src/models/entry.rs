//! Feed entry model.

use chrono::{DateTime, Utc};

use super::BulkAction;

/// One article parsed from a feed.
///
/// Ephemeral: produced by feed parsing, consumed by the ingest pipeline
/// within the same request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Article URL, the identity key for deduplication
    pub link: String,

    /// Article title
    pub title: String,

    /// Publication timestamp parsed from the feed's native date format
    pub published_at: DateTime<Utc>,
}

impl FeedEntry {
    /// Build the bulk add action submitted to Pocket for this entry.
    pub fn to_add_action(&self) -> BulkAction {
        BulkAction::Add {
            url: self.link.clone(),
            title: self.title.clone(),
            time: self.published_at.timestamp(),
        }
    }
}
