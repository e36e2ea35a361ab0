//! Custom error types for the idea-scout orchestrator
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Configuration errors, raised by `Config::validate` or a scraper's
    /// `ValidateConfig` check. These are the only errors that cross out of
    /// the orchestrator's public API as a `Result::Err` — every per-source
    /// failure is captured inside the returned `AggregatedResult` instead.
    #[error("configuration error: {0}")]
    Config(String),

    /// A source scraper's configuration was rejected at registration.
    #[error("scraper '{name}' rejected at registration: {reason}")]
    ScraperConfig { name: String, reason: String },

    /// Network errors surfaced while a scraper builds/sends a request.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// IO errors (env file loading, etc).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generic error, used for wrapping scraper panics caught as task joins.
    #[error("{0}")]
    Other(String),
}

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, ScoutError>;
