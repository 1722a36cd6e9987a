//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use crate::keyspace::KeyStrategy;
use thiserror::Error;

/// Shortest accepted request timeout.
const MIN_TIMEOUT_MS: u64 = 100;

/// Longest accepted request timeout (5 minutes).
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `search_url` is not an http(s) URL
    /// - `timeout_ms` or `download_timeout_ms` is outside 100ms..=5min
    /// - any worker count or `queue_capacity` is 0
    /// - `iterations` is 0 under the `random` strategy
    /// - the alphabet is empty, repeats a symbol, or leaves `[a-z0-9]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.search_url.starts_with("http://") || self.search_url.starts_with("https://")) {
            return Err(ConfigError::Invalid { field: "search_url".into(), reason: "must be an http(s) URL".into() });
        }

        check_timeout("timeout_ms", self.timeout_ms)?;
        check_timeout("download_timeout_ms", self.download_timeout_ms)?;

        for (field, value) in [
            ("key_workers", self.key_workers),
            ("download_workers", self.download_workers),
            ("queue_capacity", self.queue_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must be greater than 0".into() });
            }
        }

        if self.strategy == KeyStrategy::Random && self.iterations == 0 {
            return Err(ConfigError::Invalid { field: "iterations".into(), reason: "must be greater than 0".into() });
        }

        self.alphabet()?;

        if self.strategy == KeyStrategy::RandomForever && self.search_interval_ms == 0 {
            tracing::warn!("random-forever with no search interval will query the endpoint as fast as it answers");
        }

        Ok(())
    }
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < MIN_TIMEOUT_MS {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
    }
    if value > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must not exceed 5 minutes (300000ms)".into() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_search_url() {
        let config = AppConfig { search_url: "ftp://example.com/?q=".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "search_url"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_download_timeout_exceeds_limit() {
        let config = AppConfig { download_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "download_timeout_ms"));
    }

    #[test]
    fn test_validate_zero_workers() {
        let config = AppConfig { download_workers: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "download_workers"));

        let config = AppConfig { queue_capacity: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "queue_capacity"));
    }

    #[test]
    fn test_validate_random_needs_iterations() {
        let config = AppConfig { strategy: KeyStrategy::Random, iterations: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "iterations"));

        // ignored by the other strategies
        let config = AppConfig { strategy: KeyStrategy::Exhaustive, iterations: 0, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_alphabet() {
        let config = AppConfig { alphabet: Some("aa".into()), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "alphabet"));

        let config = AppConfig { alphabet: Some("AB".into()), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { timeout_ms: 100, download_timeout_ms: 300_000, key_workers: 1, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
