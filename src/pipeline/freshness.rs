//! Eligibility filter for feed entries.

use crate::models::{FeedEntry, SavedItemSnapshot};

/// Decide whether an entry should be ingested.
///
/// Eligible iff the URL is not already saved AND the entry was published
/// strictly after the most recently added item. Both conditions are
/// required: URL dedup alone re-admits replayed backlog under changed
/// URLs, and the timestamp alone re-admits URLs that were saved and
/// since removed.
pub fn is_eligible(entry: &FeedEntry, snapshot: &SavedItemSnapshot) -> bool {
    !snapshot.existing_urls.contains(entry.link.as_str())
        && entry.published_at > snapshot.last_added
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn entry(link: &str, published_at: DateTime<Utc>) -> FeedEntry {
        FeedEntry {
            link: link.into(),
            title: "t".into(),
            published_at,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn snapshot(urls: &[&str], last_added: DateTime<Utc>) -> SavedItemSnapshot {
        SavedItemSnapshot {
            existing_urls: urls.iter().map(|u| u.to_string()).collect(),
            last_added,
        }
    }

    #[test]
    fn known_url_is_rejected_regardless_of_timestamp() {
        let snap = snapshot(&["https://example.com/a"], at(100));
        assert!(!is_eligible(&entry("https://example.com/a", at(999)), &snap));
    }

    #[test]
    fn stale_timestamp_is_rejected_even_for_novel_url() {
        let snap = snapshot(&[], at(100));
        assert!(!is_eligible(&entry("https://example.com/new", at(50)), &snap));
    }

    #[test]
    fn timestamp_equal_to_last_added_is_rejected() {
        let snap = snapshot(&[], at(100));
        assert!(!is_eligible(&entry("https://example.com/new", at(100)), &snap));
    }

    #[test]
    fn novel_and_fresh_is_accepted() {
        let snap = snapshot(&["https://example.com/old"], at(100));
        assert!(is_eligible(&entry("https://example.com/new", at(101)), &snap));
    }

    #[test]
    fn everything_fresh_against_empty_snapshot() {
        let snap = SavedItemSnapshot::empty();
        assert!(is_eligible(&entry("https://example.com/a", at(0)), &snap));
    }
}
