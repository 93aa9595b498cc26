// src/models/mod.rs

//! Domain models for the feedstash application.

mod config;
mod entry;
mod remote;

// Re-export all public types
pub use config::{
    Config, HousekeepingConfig, IngestConfig, RemoteConfig, ServerConfig, SourceConfig,
};
pub use entry::FeedEntry;
pub use remote::{BulkAction, HousekeepOp, LifecycleState, RemoteItem, SavedItemSnapshot};
