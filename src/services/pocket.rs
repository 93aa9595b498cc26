//! Pocket API client.
//!
//! Wraps the three v3 operations this service uses: searching saved items
//! by source, retrieving items in a lifecycle state, and submitting bulk
//! modify actions. Non-success statuses are surfaced to callers as
//! `AppError::Remote`; they must never be read as "nothing saved yet".

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{BulkAction, LifecycleState, RemoteConfig, RemoteItem, SavedItemSnapshot};

use super::StashClient;

/// Client for the Pocket v3 API.
pub struct PocketClient {
    client: reqwest::Client,
    endpoint: String,
    consumer_key: String,
    access_token: String,
}

/// Response shape of Pocket's retrieve/search endpoint.
///
/// `list` is a map of item id to item, except when there are no items,
/// in which case Pocket sends an empty JSON array instead.
#[derive(Debug, Deserialize)]
struct RetrievePayload {
    #[serde(default, deserialize_with = "item_list")]
    list: Vec<RemoteItem>,
}

fn item_list<'de, D>(deserializer: D) -> std::result::Result<Vec<RemoteItem>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListRepr {
        Map(HashMap<String, RemoteItem>),
        Seq(Vec<RemoteItem>),
    }

    Ok(match ListRepr::deserialize(deserializer)? {
        ListRepr::Map(map) => map.into_values().collect(),
        ListRepr::Seq(items) => items,
    })
}

impl PocketClient {
    /// Create a new client from the remote configuration.
    pub fn new(client: reqwest::Client, config: &RemoteConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            consumer_key: config.consumer_key.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Issue a retrieve-style request and parse the item list.
    async fn get_items(
        &self,
        operation: &'static str,
        params: serde_json::Value,
    ) -> Result<Vec<RemoteItem>> {
        let response = self
            .client
            .post(format!("{}/get", self.endpoint))
            .json(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::remote(operation, status.as_u16()));
        }

        let payload: RetrievePayload = response.json().await?;
        debug!("{} returned {} items", operation, payload.list.len());
        Ok(payload.list)
    }

    fn added_at_or_min(item: &RemoteItem) -> DateTime<Utc> {
        item.added_at().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[async_trait]
impl StashClient for PocketClient {
    async fn search(&self, source: &str) -> Result<SavedItemSnapshot> {
        let params = serde_json::json!({
            "consumer_key": self.consumer_key,
            "access_token": self.access_token,
            "search": source,
            "sort": "newest",
        });

        // The wire list is a map, so the requested sort order is not
        // preserved through deserialization. Re-sort newest-first before
        // the snapshot reads its first element.
        let mut items = self.get_items("search", params).await?;
        items.sort_by_key(|item| Reverse(Self::added_at_or_min(item)));
        Ok(SavedItemSnapshot::from_newest_first(&items))
    }

    async fn retrieve(&self, state: LifecycleState) -> Result<Vec<RemoteItem>> {
        let params = serde_json::json!({
            "consumer_key": self.consumer_key,
            "access_token": self.access_token,
            "state": state.as_str(),
            "sort": "oldest",
        });

        let mut items = self.get_items("retrieve", params).await?;
        items.sort_by_key(Self::added_at_or_min);
        Ok(items)
    }

    async fn submit_batch(&self, actions: &[BulkAction]) -> Result<()> {
        // The bulk endpoint takes the action list URL-encoded as a single
        // request parameter.
        let encoded = serde_json::to_string(actions)?;
        let response = self
            .client
            .post(format!("{}/send", self.endpoint))
            .query(&[
                ("consumer_key", self.consumer_key.as_str()),
                ("access_token", self.access_token.as_str()),
                ("actions", encoded.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::remote("send", status.as_u16()));
        }

        debug!("submitted batch of {} actions", actions.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_list_parses_item_map() {
        let json = r#"{
            "status": 1,
            "list": {
                "229279689": {
                    "item_id": "229279689",
                    "given_url": "https://example.com/article",
                    "favorite": "0",
                    "time_added": "1704067200"
                }
            }
        }"#;

        let payload: RetrievePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.list.len(), 1);
        assert_eq!(payload.list[0].item_id, "229279689");
        assert_eq!(payload.list[0].given_url, "https://example.com/article");
    }

    #[test]
    fn payload_list_parses_empty_array() {
        // Pocket sends "list": [] instead of an empty object when the
        // result set is empty.
        let json = r#"{ "status": 2, "list": [] }"#;
        let payload: RetrievePayload = serde_json::from_str(json).unwrap();
        assert!(payload.list.is_empty());
    }

    #[test]
    fn payload_tolerates_missing_list() {
        let json = r#"{ "status": 2 }"#;
        let payload: RetrievePayload = serde_json::from_str(json).unwrap();
        assert!(payload.list.is_empty());
    }
}
