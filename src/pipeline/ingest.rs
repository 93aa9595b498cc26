//! Feed ingestion pipeline.
//!
//! One ingestion trigger resolves a source's feed URLs, takes a fresh
//! snapshot of what Pocket already holds for that source, and fans the
//! feeds out across a bounded worker pool. Each worker walks its feed
//! oldest-first and submits eligible entries in fixed-size batches.

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{BulkAction, FeedEntry, SavedItemSnapshot};
use crate::services::{FeedSource, StashClient};

use super::freshness::is_eligible;

/// Summary of one ingestion run.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub feeds_total: usize,
    pub feeds_failed: usize,
    pub entries_seen: usize,
    pub entries_submitted: usize,
    pub batches_submitted: usize,
    pub batches_failed: usize,
}

/// Per-feed counters folded into the run outcome.
#[derive(Debug, Default)]
struct FeedStats {
    entries_seen: usize,
    entries_submitted: usize,
    batches_submitted: usize,
    batches_failed: usize,
}

impl IngestOutcome {
    fn absorb(&mut self, stats: FeedStats) {
        self.entries_seen += stats.entries_seen;
        self.entries_submitted += stats.entries_submitted;
        self.batches_submitted += stats.batches_submitted;
        self.batches_failed += stats.batches_failed;
    }
}

/// Run ingestion for one source.
///
/// Fails fast when the snapshot cannot be fetched: proceeding with an
/// empty snapshot would re-ingest the entire backlog.
pub async fn run_ingest(
    stash: &dyn StashClient,
    fetcher: &dyn FeedSource,
    source: &str,
    feed_urls: &[String],
    batch_size: usize,
    max_concurrent: usize,
) -> Result<IngestOutcome> {
    let snapshot = stash.search(source).await?;
    info!(
        "source '{}': {} urls already saved, last added {}",
        source,
        snapshot.existing_urls.len(),
        snapshot.last_added
    );

    let concurrency = max_concurrent.max(1);
    let mut outcome = IngestOutcome {
        feeds_total: feed_urls.len(),
        ..IngestOutcome::default()
    };

    let snapshot = &snapshot;
    let mut feed_stream = stream::iter(0..feed_urls.len())
        .map(|idx| {
            let url = &feed_urls[idx];
            let fut = ingest_feed(stash, fetcher, url, snapshot, batch_size);
            async move { (url, fut.await) }
        })
        .buffer_unordered(concurrency);

    while let Some((url, result)) = feed_stream.next().await {
        match result {
            Ok(stats) => outcome.absorb(stats),
            Err(error) => {
                outcome.feeds_failed += 1;
                warn!("failed to process feed {}: {}", url, error);
            }
        }
    }

    info!(
        "source '{}': submitted {} of {} entries across {} batches ({} feeds failed)",
        source,
        outcome.entries_submitted,
        outcome.entries_seen,
        outcome.batches_submitted,
        outcome.feeds_failed
    );

    Ok(outcome)
}

/// Fetch one feed and ingest its entries.
async fn ingest_feed(
    stash: &dyn StashClient,
    fetcher: &dyn FeedSource,
    feed_url: &str,
    snapshot: &SavedItemSnapshot,
    batch_size: usize,
) -> Result<FeedStats> {
    let entries = fetcher.fetch_oldest_first(feed_url).await?;
    Ok(ingest_entries(stash, feed_url, entries, snapshot, batch_size).await)
}

/// Batch and submit eligible entries, oldest first.
///
/// A batch is submitted as soon as it reaches capacity; the final partial
/// batch follows. A failed submission is logged and skipped — the bulk
/// endpoint is not idempotent, and the next scheduled run re-derives
/// eligibility from a fresh snapshot.
async fn ingest_entries(
    stash: &dyn StashClient,
    feed_url: &str,
    entries: Vec<FeedEntry>,
    snapshot: &SavedItemSnapshot,
    batch_size: usize,
) -> FeedStats {
    let mut stats = FeedStats::default();
    let mut batch: Vec<BulkAction> = Vec::with_capacity(batch_size);

    for entry in entries {
        stats.entries_seen += 1;
        if !is_eligible(&entry, snapshot) {
            continue;
        }

        batch.push(entry.to_add_action());
        if batch.len() == batch_size {
            submit(stash, feed_url, &mut batch, &mut stats).await;
        }
    }

    if !batch.is_empty() {
        submit(stash, feed_url, &mut batch, &mut stats).await;
    }

    stats
}

async fn submit(
    stash: &dyn StashClient,
    feed_url: &str,
    batch: &mut Vec<BulkAction>,
    stats: &mut FeedStats,
) {
    let actions = std::mem::take(batch);
    match stash.submit_batch(&actions).await {
        Ok(()) => {
            stats.batches_submitted += 1;
            stats.entries_submitted += actions.len();
        }
        Err(error) => {
            stats.batches_failed += 1;
            warn!(
                "{}: batch of {} actions not submitted: {}",
                feed_url,
                actions.len(),
                error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SavedItemSnapshot;
    use crate::pipeline::testutil::{FakeFeeds, FakeStash};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::Ordering;

    fn entries_from(prefix: &str, n: usize) -> Vec<FeedEntry> {
        // Oldest-first, one hour apart.
        (0..n)
            .map(|i| FeedEntry {
                link: format!("https://example.com/{prefix}/{i}"),
                title: format!("Entry {prefix}/{i}"),
                published_at: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
            })
            .collect()
    }

    fn entries(n: usize) -> Vec<FeedEntry> {
        entries_from("feed", n)
    }

    #[tokio::test]
    async fn ten_entries_batch_size_eight_yields_two_batches() {
        let stash = FakeStash::new();
        let snapshot = SavedItemSnapshot::empty();

        let stats = ingest_entries(&stash, "feed", entries(10), &snapshot, 8).await;

        let submissions = stash.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].len(), 8);
        assert_eq!(submissions[1].len(), 2);
        assert_eq!(stats.entries_submitted, 10);
        assert_eq!(stats.batches_submitted, 2);

        // Oldest entry leads the first batch.
        match &submissions[0][0] {
            BulkAction::Add { url, .. } => assert_eq!(url, "https://example.com/feed/0"),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[tokio::test]
    async fn batches_preserve_oldest_first_order() {
        let stash = FakeStash::new();
        let snapshot = SavedItemSnapshot::empty();

        ingest_entries(&stash, "feed", entries(7), &snapshot, 3).await;

        let submissions = stash.submissions.lock().unwrap();
        let urls: Vec<&str> = submissions
            .iter()
            .flatten()
            .map(|action| match action {
                BulkAction::Add { url, .. } => url.as_str(),
                other => panic!("unexpected action: {other:?}"),
            })
            .collect();

        let expected: Vec<String> = (0..7)
            .map(|i| format!("https://example.com/feed/{i}"))
            .collect();
        assert_eq!(urls, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(submissions.len(), 3);
    }

    #[tokio::test]
    async fn ineligible_entries_are_not_batched() {
        let stash = FakeStash::new();
        let all = entries(4);
        let snapshot = SavedItemSnapshot {
            existing_urls: [all[1].link.clone()].into_iter().collect(),
            last_added: all[0].published_at, // strict: entry 0 itself is stale
        };

        let stats = ingest_entries(&stash, "feed", all, &snapshot, 8).await;

        let submissions = stash.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].len(), 2);
        assert_eq!(stats.entries_seen, 4);
        assert_eq!(stats.entries_submitted, 2);
    }

    #[tokio::test]
    async fn failed_batch_does_not_block_later_batches() {
        let stash = FakeStash::new();
        *stash.submit_failures.lock().unwrap() = 1;
        let snapshot = SavedItemSnapshot::empty();

        let stats = ingest_entries(&stash, "feed", entries(10), &snapshot, 4).await;

        // First batch of 4 fails; the remaining 4+2 go through.
        let submissions = stash.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 2);
        assert_eq!(stats.batches_failed, 1);
        assert_eq!(stats.batches_submitted, 2);
        assert_eq!(stats.entries_submitted, 6);
    }

    #[tokio::test]
    async fn snapshot_fetch_failure_aborts_before_any_submission() {
        let mut stash = FakeStash::new();
        stash.search_status = Some(429);
        let fetcher = FakeFeeds::new();
        fetcher.insert("https://feeds.example.com/a.xml", entries(3));
        let feeds = vec!["https://feeds.example.com/a.xml".to_string()];

        let result = run_ingest(&stash, &fetcher, "news", &feeds, 8, 4).await;

        assert_eq!(result.unwrap_err().remote_status(), Some(429));
        assert!(stash.submissions.lock().unwrap().is_empty());
        // Without the snapshot, no feed is even fetched.
        assert_eq!(fetcher.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_feed_does_not_abort_siblings() {
        let stash = FakeStash::new();
        let fetcher = FakeFeeds::new();
        fetcher.insert("https://feeds.example.com/a.xml", entries_from("a", 2));
        fetcher.fail("https://feeds.example.com/b.xml", "connection refused");
        fetcher.insert("https://feeds.example.com/c.xml", entries_from("c", 1));
        let feeds: Vec<String> = ["a", "b", "c"]
            .iter()
            .map(|name| format!("https://feeds.example.com/{name}.xml"))
            .collect();

        let outcome = run_ingest(&stash, &fetcher, "news", &feeds, 8, 2)
            .await
            .unwrap();

        assert_eq!(outcome.feeds_total, 3);
        assert_eq!(outcome.feeds_failed, 1);
        assert_eq!(outcome.entries_submitted, 3);
        assert_eq!(outcome.batches_submitted, 2);

        // Both healthy feeds made it through, batched per feed.
        let submissions = stash.submissions.lock().unwrap();
        let mut urls: Vec<String> = submissions
            .iter()
            .flatten()
            .map(|action| match action {
                BulkAction::Add { url, .. } => url.clone(),
                other => panic!("unexpected action: {other:?}"),
            })
            .collect();
        urls.sort();
        assert_eq!(
            urls,
            vec![
                "https://example.com/a/0",
                "https://example.com/a/1",
                "https://example.com/c/0",
            ]
        );
    }
}
