//! Feed fetching and parsing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rss::Channel;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::FeedEntry;

use super::FeedSource;

/// Fetches RSS feeds over HTTP and parses them into entries.
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    /// Fetch a feed and return its entries oldest-first.
    ///
    /// Feeds list newest entries first; processing in reverse means a
    /// partial failure leaves the older backlog already submitted rather
    /// than leaving holes behind the newest entries.
    async fn fetch_oldest_first(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        let response = self.client.get(feed_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::feed(feed_url, format!("HTTP {}", status)));
        }

        let bytes = response.bytes().await?;
        let channel = Channel::read_from(bytes.as_ref())
            .map_err(|e| AppError::feed(feed_url, e))?;

        let mut entries = parse_entries(&channel, feed_url);
        entries.reverse();
        Ok(entries)
    }
}

/// Parse a channel into entries, in the feed's native (newest-first) order.
///
/// Entries missing a link or title, or carrying an unparsable publication
/// date, are skipped with a warning; one bad entry never fails the feed.
pub fn parse_entries(channel: &Channel, feed_url: &str) -> Vec<FeedEntry> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let Some(link) = item.link() else {
                warn!("{}: skipping entry without link", feed_url);
                return None;
            };
            let Some(title) = item.title() else {
                warn!("{}: skipping entry without title: {}", feed_url, link);
                return None;
            };
            let Some(published_at) = item.pub_date().and_then(parse_pub_date) else {
                warn!(
                    "{}: skipping entry with missing or unparsable date: {}",
                    feed_url, link
                );
                return None;
            };

            Some(FeedEntry {
                link: link.to_string(),
                title: title.to_string(),
                published_at,
            })
        })
        .collect()
}

/// Parse an RSS pubDate (RFC 2822) into a UTC timestamp.
fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
