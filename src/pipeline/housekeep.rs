//! Housekeeping pipeline.
//!
//! Repeatedly retrieves items in one lifecycle state, selects the
//! non-favorited ones older than the policy cutoff, and submits a bulk
//! state transition for the whole selection. Pocket caps how much one
//! retrieve returns, so the loop drains the backlog round by round; it
//! terminates naturally once a round selects nothing. Rounds are strictly
//! sequential — each retrieve must observe the previous submit.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{BulkAction, HousekeepOp, HousekeepingConfig, LifecycleState, RemoteItem};
use crate::services::StashClient;

/// One housekeeping pass: which items to look at, what to do with the
/// stale ones, and how old counts as stale.
#[derive(Debug, Clone)]
pub struct HousekeepPolicy {
    pub state: LifecycleState,
    pub op: HousekeepOp,
    pub max_age: Duration,
}

impl HousekeepPolicy {
    /// Unread items past the configured age are archived.
    pub fn archive_pass(config: &HousekeepingConfig) -> Self {
        Self {
            state: LifecycleState::Unread,
            op: HousekeepOp::Archive,
            max_age: Duration::hours(config.archive_after_hours as i64),
        }
    }

    /// Archived items past the configured age are deleted.
    pub fn delete_pass(config: &HousekeepingConfig) -> Self {
        Self {
            state: LifecycleState::Archive,
            op: HousekeepOp::Delete,
            max_age: Duration::days(config.delete_after_days as i64),
        }
    }
}

/// Terminal outcome of one housekeeping invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HousekeepOutcome {
    /// The backlog is drained: a round selected nothing.
    Done { rounds: usize, items_processed: usize },

    /// The remote service refused a call; non-success here is its
    /// usage-limit signal. Nothing further is attempted this invocation.
    Blocked { status: u16 },
}

/// Run one housekeeping pass to completion.
///
/// The cutoff is computed once per invocation so late rounds do not see
/// a drifting threshold. Transport-level failures propagate as errors;
/// remote non-success statuses resolve to `Blocked`.
pub async fn run_housekeep(
    stash: &dyn StashClient,
    policy: &HousekeepPolicy,
) -> Result<HousekeepOutcome> {
    let cutoff = Utc::now() - policy.max_age;
    let mut rounds = 0;
    let mut items_processed = 0;

    loop {
        let items = match stash.retrieve(policy.state).await {
            Ok(items) => items,
            Err(error) => match error.remote_status() {
                Some(status) => {
                    warn!(
                        "housekeeping {} pass blocked: retrieve refused with HTTP {}",
                        policy.op.as_str(),
                        status
                    );
                    return Ok(HousekeepOutcome::Blocked { status });
                }
                None => return Err(error),
            },
        };
        rounds += 1;

        let actions = select_actions(&items, cutoff, policy.op);
        if actions.is_empty() {
            info!(
                "housekeeping {} pass done: {} items in {} rounds",
                policy.op.as_str(),
                items_processed,
                rounds
            );
            return Ok(HousekeepOutcome::Done {
                rounds,
                items_processed,
            });
        }

        // A failed submit would make the next round retrieve the same
        // page again; stop instead of spinning.
        if let Err(error) = stash.submit_batch(&actions).await {
            match error.remote_status() {
                Some(status) => {
                    warn!(
                        "housekeeping {} pass blocked: submit refused with HTTP {}",
                        policy.op.as_str(),
                        status
                    );
                    return Ok(HousekeepOutcome::Blocked { status });
                }
                None => return Err(error),
            }
        }
        items_processed += actions.len();
    }
}

/// Select the bulk actions for one round.
///
/// Favorited items are permanently exempt. Items whose `time_added`
/// does not parse are left alone: an item of unknown age is never
/// archived or deleted.
fn select_actions(
    items: &[RemoteItem],
    cutoff: DateTime<Utc>,
    op: HousekeepOp,
) -> Vec<BulkAction> {
    items
        .iter()
        .filter(|item| !item.is_favorite())
        .filter(|item| item.added_at().is_some_and(|added| added < cutoff))
        .map(|item| op.action_for(&item.item_id))
        .collect()
}
