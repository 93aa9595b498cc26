//! Models for data exchanged with the Pocket API.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved item as returned by Pocket's retrieve/search endpoints.
///
/// Pocket string-encodes numeric and boolean fields on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteItem {
    /// Opaque identifier, required for modify actions
    pub item_id: String,

    /// The URL the item was saved with
    #[serde(default)]
    pub given_url: String,

    /// Epoch seconds the item was added, string-encoded
    #[serde(default)]
    pub time_added: String,

    /// "1" when favorited, "0" otherwise
    #[serde(default)]
    pub favorite: String,
}

impl RemoteItem {
    /// Whether the item is favorited. Favorited items are exempt from
    /// housekeeping.
    pub fn is_favorite(&self) -> bool {
        self.favorite == "1"
    }

    /// The time the item was added, if `time_added` parses.
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        self.time_added
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

/// Per-source view of what Pocket already holds.
///
/// Built once per ingestion trigger from a fresh search and passed
/// read-only to every concurrent feed worker. Never cached across
/// requests: stale cross-request reuse would re-admit or miss entries.
#[derive(Debug, Clone)]
pub struct SavedItemSnapshot {
    /// URLs already saved for this source
    pub existing_urls: HashSet<String>,

    /// When the most recently added matching item was saved.
    /// The minimum representable timestamp when nothing is saved yet.
    pub last_added: DateTime<Utc>,
}

impl SavedItemSnapshot {
    /// An empty snapshot for a source with no saved items.
    pub fn empty() -> Self {
        Self {
            existing_urls: HashSet::new(),
            last_added: DateTime::<Utc>::MIN_UTC,
        }
    }

    /// Build a snapshot from items sorted newest-first.
    ///
    /// `last_added` is taken from the first element of the newest-first
    /// ordering, not from an arbitrary item.
    pub fn from_newest_first(items: &[RemoteItem]) -> Self {
        let last_added = items
            .first()
            .and_then(RemoteItem::added_at)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let existing_urls = items
            .iter()
            .filter(|item| !item.given_url.is_empty())
            .map(|item| item.given_url.clone())
            .collect();

        Self {
            existing_urls,
            last_added,
        }
    }
}

/// Lifecycle state of a saved item on the Pocket side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unread,
    Archive,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Unread => "unread",
            LifecycleState::Archive => "archive",
        }
    }
}

/// Housekeeping operation applied to stale items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HousekeepOp {
    Archive,
    Delete,
}

impl HousekeepOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            HousekeepOp::Archive => "archive",
            HousekeepOp::Delete => "delete",
        }
    }

    /// Build the bulk action carrying out this operation on one item.
    pub fn action_for(&self, item_id: &str) -> BulkAction {
        match self {
            HousekeepOp::Archive => BulkAction::Archive {
                item_id: item_id.to_string(),
            },
            HousekeepOp::Delete => BulkAction::Delete {
                item_id: item_id.to_string(),
            },
        }
    }
}

/// One action inside a bulk modify request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum BulkAction {
    /// Save a new article
    Add { url: String, title: String, time: i64 },

    /// Move an item to the archive
    Archive { item_id: String },

    /// Permanently delete an item
    Delete { item_id: String },
}
