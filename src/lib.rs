// src/lib.rs

//! feedstash library
//!
//! Pulls articles from configured RSS feeds, forwards the ones Pocket does
//! not already hold, and housekeeps the saved-item inventory on a schedule
//! driven by an external pinger.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod services;
