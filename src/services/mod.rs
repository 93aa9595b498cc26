//! Service layer for the feedstash application.
//!
//! This module contains the network-facing code:
//! - Pocket API access (`PocketClient`, behind the `StashClient` trait)
//! - Feed fetching and parsing (`FeedFetcher`)

mod feeds;
mod pocket;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    BulkAction, FeedEntry, LifecycleState, RemoteConfig, RemoteItem, SavedItemSnapshot,
};

pub use feeds::FeedFetcher;
pub use pocket::PocketClient;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &RemoteConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Trait for a source of feed entries.
///
/// The ingest dispatcher works against this seam so its fan-out and
/// per-feed failure isolation can be exercised with scripted feeds.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch a feed and return its entries oldest-first.
    async fn fetch_oldest_first(&self, feed_url: &str) -> Result<Vec<FeedEntry>>;
}

/// Trait for the remote read-it-later store.
///
/// Pipelines depend on this seam instead of the concrete Pocket client so
/// their ordering and failure behavior can be exercised without a network.
#[async_trait]
pub trait StashClient: Send + Sync {
    /// Fetch the saved-item snapshot for a source.
    ///
    /// A non-success remote status surfaces as `AppError::Remote`, never
    /// as an empty snapshot.
    async fn search(&self, source: &str) -> Result<SavedItemSnapshot>;

    /// Retrieve all items in the given lifecycle state, oldest first.
    async fn retrieve(&self, state: LifecycleState) -> Result<Vec<RemoteItem>>;

    /// Submit one bulk action batch.
    ///
    /// Not retried on failure: the bulk endpoint is not idempotent and
    /// the next scheduled run re-derives eligibility anyway.
    async fn submit_batch(&self, actions: &[BulkAction]) -> Result<()>;
}
