//! Utility module
//!
//! - Retry logic with exponential backoff
//! - Timestamp formatting for logs
//! - Small numeric helpers

pub mod helpers;

pub use helpers::{clamp, format_timestamp, now_formatted, retry_with_backoff, RetryConfig};
