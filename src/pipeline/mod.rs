//! Pipeline entry points for triggered operations.
//!
//! - `run_ingest`: forward new feed entries for one source to Pocket
//! - `run_housekeep`: archive or delete stale saved items

mod freshness;
mod housekeep;
mod ingest;

pub use freshness::is_eligible;
pub use housekeep::{run_housekeep, HousekeepOutcome, HousekeepPolicy};
pub use ingest::{run_ingest, IngestOutcome};
