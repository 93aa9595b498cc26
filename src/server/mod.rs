//! HTTP trigger surface.
//!
//! Thin routing layer for an external cron-style pinger; every route
//! resolves to a plain function call into the pipeline and answers with
//! a short human-readable string. The pipelines themselves carry no
//! dependency on this layer.

mod auth;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tracing::error;

use crate::models::Config;
use crate::pipeline::{run_housekeep, run_ingest, HousekeepOutcome, HousekeepPolicy};
use crate::services::{FeedSource, StashClient};

/// Shared state for the trigger routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stash: Arc<dyn StashClient>,
    pub fetcher: Arc<dyn FeedSource>,
}

/// Build the trigger router. The health route stays unauthenticated.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/save/:source", get(save))
        .route("/housekeep", get(housekeep))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .route("/", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "feedstash is alive"
}

/// Trigger ingestion for one configured source.
async fn save(
    Path(source): Path<String>,
    State(state): State<AppState>,
) -> (StatusCode, String) {
    let Some(feeds) = state.config.feeds_for(&source) else {
        return (
            StatusCode::NOT_FOUND,
            format!("unknown source '{}'", source),
        );
    };

    let result = run_ingest(
        state.stash.as_ref(),
        state.fetcher.as_ref(),
        &source,
        feeds,
        state.config.ingest.batch_size,
        state.config.ingest.max_concurrent,
    )
    .await;

    match result {
        Ok(outcome) => (
            StatusCode::OK,
            format!(
                "saved {} new items from {} feeds for source '{}' ({} feeds failed)",
                outcome.entries_submitted, outcome.feeds_total, source, outcome.feeds_failed
            ),
        ),
        Err(e) => match e.remote_status() {
            // The snapshot could not be fetched; proceeding would treat
            // everything as new. Report and skip the run.
            Some(status) => (
                StatusCode::OK,
                format!(
                    "cannot fetch saved items for '{}' (HTTP {}), skipping this run",
                    source, status
                ),
            ),
            None => {
                error!("ingestion for '{}' failed: {}", source, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("ingestion failed: {}", e),
                )
            }
        },
    }
}

/// Trigger both housekeeping passes: archive stale unread items, then
/// delete stale archived ones.
async fn housekeep(State(state): State<AppState>) -> (StatusCode, String) {
    let passes = [
        HousekeepPolicy::archive_pass(&state.config.housekeeping),
        HousekeepPolicy::delete_pass(&state.config.housekeeping),
    ];

    for policy in &passes {
        match run_housekeep(state.stash.as_ref(), policy).await {
            Ok(HousekeepOutcome::Done { .. }) => {}
            Ok(HousekeepOutcome::Blocked { status }) => {
                return (
                    StatusCode::OK,
                    format!(
                        "housekeeping blocked: usage limit reached (HTTP {})",
                        status
                    ),
                );
            }
            Err(e) => {
                error!("housekeeping failed: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("housekeeping failed: {}", e),
                );
            }
        }
    }

    (StatusCode::OK, "housekeeping is done".to_string())
}
