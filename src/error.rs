// src/error.rs

//! Unified error handling for the feedstash application.

use std::fmt;

use thiserror::Error;

/// Result type alias for feedstash operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (transport-level)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feed fetching or parsing failed
    #[error("Feed error for {context}: {message}")]
    Feed { context: String, message: String },

    /// The remote service answered with a non-success status.
    ///
    /// The status is carried so callers can distinguish "the service
    /// refused" from "the service holds nothing" — the two must never
    /// be conflated.
    #[error("remote {operation} returned HTTP {status}")]
    Remote { operation: &'static str, status: u16 },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a feed error with context.
    pub fn feed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Feed {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a remote-status error.
    pub fn remote(operation: &'static str, status: u16) -> Self {
        Self::Remote { operation, status }
    }

    /// The HTTP status the remote service answered with, if this error
    /// came from the remote service boundary.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
