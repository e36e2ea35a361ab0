//! Security module
//!
//! - Secret validation and sanitized logging
//! - Rate limiting for per-source HTTP calls

pub mod rate_limiter;
pub mod secrets_manager;

pub use rate_limiter::{ApiRateLimiter, RateLimiterConfig};
pub use secrets_manager::{SecretString, SecretValidator};
