//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHEETSWEEP_*)
//! 2. TOML config file (if SHEETSWEEP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::keyspace::{Alphabet, KeyStrategy};

mod validation;

pub use validation::ConfigError;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_FILE_ENV: &str = "SHEETSWEEP_CONFIG_FILE";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SHEETSWEEP_";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHEETSWEEP_*)
/// 2. TOML config file (if SHEETSWEEP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding one `<key>.json` search response per key.
    ///
    /// Set via SHEETSWEEP_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Directory downloaded documents are written into.
    ///
    /// Set via SHEETSWEEP_DOWNLOAD_DIR environment variable.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Search endpoint prefix; the key is appended verbatim.
    ///
    /// Set via SHEETSWEEP_SEARCH_URL environment variable.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Search request timeout in milliseconds.
    ///
    /// Set via SHEETSWEEP_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Download request timeout in milliseconds.
    ///
    /// Set via SHEETSWEEP_DOWNLOAD_TIMEOUT_MS environment variable.
    #[serde(default = "default_download_timeout_ms")]
    pub download_timeout_ms: u64,

    /// Key enumeration strategy: `random`, `exhaustive`, or `random-forever`.
    ///
    /// Set via SHEETSWEEP_STRATEGY environment variable.
    #[serde(default)]
    pub strategy: KeyStrategy,

    /// Number of keys drawn by the `random` strategy.
    ///
    /// Set via SHEETSWEEP_ITERATIONS environment variable.
    #[serde(default = "default_iterations")]
    pub iterations: u64,

    /// Key alphabet. Defaults to the strategy's own alphabet when unset.
    ///
    /// Set via SHEETSWEEP_ALPHABET environment variable.
    #[serde(default)]
    pub alphabet: Option<String>,

    /// Minimum spacing between search requests in milliseconds.
    ///
    /// Set via SHEETSWEEP_SEARCH_INTERVAL_MS environment variable.
    #[serde(default = "default_search_interval_ms")]
    pub search_interval_ms: u64,

    /// Concurrent key resolutions.
    ///
    /// Set via SHEETSWEEP_KEY_WORKERS environment variable.
    #[serde(default = "default_key_workers")]
    pub key_workers: usize,

    /// Concurrent downloads.
    ///
    /// Set via SHEETSWEEP_DOWNLOAD_WORKERS environment variable.
    #[serde(default = "default_download_workers")]
    pub download_workers: usize,

    /// Capacity of the queues between pipeline stages.
    ///
    /// Set via SHEETSWEEP_QUEUE_CAPACITY environment variable.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("PDFs")
}

fn default_search_url() -> String {
    "https://www.hillyard.com/safetydatasheet/search/results?q=".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_download_timeout_ms() -> u64 {
    30_000
}

fn default_iterations() -> u64 {
    100
}

fn default_search_interval_ms() -> u64 {
    250
}

fn default_key_workers() -> usize {
    2
}

fn default_download_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            download_dir: default_download_dir(),
            search_url: default_search_url(),
            timeout_ms: default_timeout_ms(),
            download_timeout_ms: default_download_timeout_ms(),
            strategy: KeyStrategy::default(),
            iterations: default_iterations(),
            alphabet: None,
            search_interval_ms: default_search_interval_ms(),
            key_workers: default_key_workers(),
            download_workers: default_download_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl AppConfig {
    /// Search timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Download timeout as Duration.
    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }

    pub fn search_interval(&self) -> Duration {
        Duration::from_millis(self.search_interval_ms)
    }

    /// The configured alphabet, or the strategy's default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the alphabet is empty, repeats a
    /// symbol, or contains characters outside `[a-z0-9]`.
    pub fn alphabet(&self) -> Result<Alphabet, ConfigError> {
        let symbols = self.alphabet.as_deref().unwrap_or(self.strategy.default_alphabet());
        Alphabet::new(symbols).map_err(|e| ConfigError::Invalid { field: "alphabet".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHEETSWEEP_`
    /// 2. TOML file from `SHEETSWEEP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var(CONFIG_FILE_ENV) {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyspace::{ALPHANUMERIC, LETTERS};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache_dir, PathBuf::from("assets"));
        assert_eq!(config.download_dir, PathBuf::from("PDFs"));
        assert!(config.search_url.ends_with("/safetydatasheet/search/results?q="));
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.download_timeout_ms, 30_000);
        assert_eq!(config.strategy, KeyStrategy::Exhaustive);
        assert_eq!(config.iterations, 100);
        assert!(config.alphabet.is_none());
        assert_eq!(config.key_workers, 2);
        assert_eq!(config.download_workers, 4);
        assert_eq!(config.queue_capacity, 64);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.download_timeout(), Duration::from_secs(30));
        assert_eq!(config.search_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_alphabet_follows_strategy() {
        let config = AppConfig::default();
        assert_eq!(config.alphabet().unwrap(), Alphabet::new(ALPHANUMERIC).unwrap());

        let config = AppConfig { strategy: KeyStrategy::Random, ..Default::default() };
        assert_eq!(config.alphabet().unwrap(), Alphabet::new(LETTERS).unwrap());

        let config = AppConfig { alphabet: Some("xyz".into()), ..Default::default() };
        assert_eq!(config.alphabet().unwrap().len(), 3);
    }

    #[test]
    fn test_load_layers() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("sheetsweep.toml", "cache_dir = \"cache\"\nstrategy = \"random\"\niterations = 7\n")?;
            jail.set_env("SHEETSWEEP_CONFIG_FILE", "sheetsweep.toml");
            jail.set_env("SHEETSWEEP_ITERATIONS", "9");
            jail.set_env("SHEETSWEEP_DOWNLOAD_WORKERS", "1");

            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.cache_dir, PathBuf::from("cache"));
            assert_eq!(config.strategy, KeyStrategy::Random);
            assert_eq!(config.iterations, 9);
            assert_eq!(config.download_workers, 1);
            assert_eq!(config.download_dir, PathBuf::from("PDFs"));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SHEETSWEEP_KEY_WORKERS", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { field, .. }) if field == "key_workers"));
            Ok(())
        });
    }
}
