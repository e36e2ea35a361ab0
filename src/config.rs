//! Configuration for the idea-scout orchestrator
//!
//! Loads configuration from environment variables and an optional `.env`
//! file, following the same `from_env()` / `validate()` shape used
//! throughout the crate for every other config-bearing component.

use crate::error::{Result, ScoutError};
use crate::modules::security::SecretString;
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Top-level configuration: orchestrator-wide limits plus per-scraper
/// settings keyed by source name.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub orchestrator: OrchestratorConfig,
    pub scrapers: ScraperConfig,
    pub logging: LoggingConfig,
}

/// Orchestrator-wide concurrency and timeout limits.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum number of scrapers run concurrently, enforced by a
    /// semaphore in front of the fan-out.
    pub max_concurrent_scrapers: usize,
    /// Global wall-clock deadline for a single `Scrape` call, in seconds.
    pub total_timeout_secs: u64,
    /// Per-source hard timeout, in seconds. A scraper exceeding this is
    /// bucketed as `failed` rather than allowed to stall the whole run.
    pub per_source_timeout_secs: u64,
}

impl OrchestratorConfig {
    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs(self.total_timeout_secs)
    }

    pub fn per_source_timeout(&self) -> Duration {
        Duration::from_secs(self.per_source_timeout_secs)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_scrapers: 5,
            total_timeout_secs: 300,
            per_source_timeout_secs: 20,
        }
    }
}

/// Shared settings applied to every registered scraper unless a source
/// overrides them via its own config.
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub max_queries_per_source: usize,
    /// Optional API key, shared by scrapers that need one (e.g. a hosted
    /// search API). Individual scrapers may also read their own
    /// `<SOURCE>_API_KEY` variable directly. Wrapped in `SecretString` so a
    /// stray `{:?}` on `Config`/`ScraperConfig` never leaks it into a log
    /// line.
    pub api_key: Option<SecretString>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: "idea-scout/0.1".to_string(),
            max_retries: 3,
            base_backoff_ms: 500,
            max_queries_per_source: 5,
            api_key: None,
        }
    }
}

/// Logging verbosity, read by `main.rs` when installing the tracing
/// subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig::default(),
            scrapers: ScraperConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, loading a `.env`
    /// file first if one is present. Every field has a sane default, so
    /// this never fails for a missing variable — only a malformed one.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            orchestrator: OrchestratorConfig {
                max_concurrent_scrapers: get_env_or("SCOUT_MAX_CONCURRENT_SCRAPERS", "5")
                    .parse()
                    .map_err(|_| {
                        ScoutError::Config("SCOUT_MAX_CONCURRENT_SCRAPERS must be a positive integer".into())
                    })?,
                total_timeout_secs: get_env_or("SCOUT_TOTAL_TIMEOUT_SECS", "300")
                    .parse()
                    .map_err(|_| ScoutError::Config("SCOUT_TOTAL_TIMEOUT_SECS must be an integer".into()))?,
                per_source_timeout_secs: get_env_or("SCOUT_PER_SOURCE_TIMEOUT_SECS", "20")
                    .parse()
                    .map_err(|_| {
                        ScoutError::Config("SCOUT_PER_SOURCE_TIMEOUT_SECS must be an integer".into())
                    })?,
            },
            scrapers: ScraperConfig {
                user_agent: get_env_or("SCOUT_USER_AGENT", "idea-scout/0.1"),
                max_retries: get_env_or("SCOUT_MAX_RETRIES", "3")
                    .parse()
                    .map_err(|_| ScoutError::Config("SCOUT_MAX_RETRIES must be an integer".into()))?,
                base_backoff_ms: get_env_or("SCOUT_BASE_BACKOFF_MS", "500")
                    .parse()
                    .map_err(|_| ScoutError::Config("SCOUT_BASE_BACKOFF_MS must be an integer".into()))?,
                max_queries_per_source: get_env_or("SCOUT_MAX_QUERIES_PER_SOURCE", "5")
                    .parse()
                    .map_err(|_| {
                        ScoutError::Config("SCOUT_MAX_QUERIES_PER_SOURCE must be an integer".into())
                    })?,
                api_key: env::var("SCOUT_API_KEY").ok().map(SecretString::from),
            },
            logging: LoggingConfig {
                level: get_env_or("SCOUT_LOG_LEVEL", "info"),
                json: get_env_or("SCOUT_LOG_JSON", "false")
                    .parse()
                    .unwrap_or(false),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Sanity-check the loaded values. Distinct from `from_env`'s own
    /// parse errors: this catches values that parsed fine but are
    /// nonsensical (zero concurrency, a timeout of zero).
    pub fn validate(&self) -> Result<()> {
        if self.orchestrator.max_concurrent_scrapers == 0 {
            return Err(ScoutError::Config(
                "SCOUT_MAX_CONCURRENT_SCRAPERS must be at least 1".into(),
            ));
        }
        if self.orchestrator.total_timeout_secs == 0 {
            return Err(ScoutError::Config(
                "SCOUT_TOTAL_TIMEOUT_SECS must be greater than 0".into(),
            ));
        }
        if self.orchestrator.per_source_timeout_secs == 0 {
            return Err(ScoutError::Config(
                "SCOUT_PER_SOURCE_TIMEOUT_SECS must be greater than 0".into(),
            ));
        }
        if self.scrapers.max_queries_per_source == 0 {
            return Err(ScoutError::Config(
                "SCOUT_MAX_QUERIES_PER_SOURCE must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut config = Config::default();
        config.orchestrator.max_concurrent_scrapers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_total_timeout() {
        let mut config = Config::default();
        config.orchestrator.total_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn orchestrator_timeouts_convert_to_duration() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.total_timeout(), Duration::from_secs(300));
        assert_eq!(config.per_source_timeout(), Duration::from_secs(20));
    }
}
