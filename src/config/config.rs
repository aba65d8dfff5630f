// src/config/config.rs
use crate::{
    miner::retry::RetryPolicy,
    types::{CounterMode, WalletMode},
    utils::error::WorkerError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for the worker
///
/// Holds the three collaborator addresses plus the loop's timing and
/// failure settings. Built once at startup, validated, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the counter store (e.g. "redis:6379" or "redis://host:6379/0")
    #[serde(default = "default_counter_store_address")]
    pub counter_store_address: String,

    /// URL answering `GET` with a random payload
    #[serde(default = "default_randomness_url")]
    pub randomness_url: String,

    /// URL answering `POST <payload>` with a hex digest
    #[serde(default = "default_hashing_url")]
    pub hashing_url: String,

    /// Key the iteration count is written to
    /// (default: "hashes")
    #[serde(default = "default_counter_key")]
    pub counter_key: String,

    /// Whether a flush overwrites the key or increments it
    #[serde(default)]
    pub counter_mode: CounterMode,

    /// Where found coins are recorded
    #[serde(default)]
    pub wallet: WalletMode,

    /// Hash that receives `digest -> payload` entries in store mode
    #[serde(default = "default_wallet_key")]
    pub wallet_key: String,

    /// Milliseconds between counter flushes
    /// (default: 1000)
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,

    /// Delay before each work unit in milliseconds
    /// (default: 100)
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Timeout for each remote call in milliseconds
    /// (default: 10000)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Failure policy for remote calls
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_counter_store_address() -> String {
    "redis:6379".into()
}

fn default_randomness_url() -> String {
    "http://rng:8002/32".into()
}

fn default_hashing_url() -> String {
    "http://hasher:8003/".into()
}

fn default_counter_key() -> String {
    "hashes".into()
}

fn default_wallet_key() -> String {
    "wallet".into()
}

fn default_report_interval_ms() -> u64 {
    1000
}

fn default_throttle_ms() -> u64 {
    100
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            counter_store_address: default_counter_store_address(),
            randomness_url: default_randomness_url(),
            hashing_url: default_hashing_url(),
            counter_key: default_counter_key(),
            counter_mode: CounterMode::default(),
            wallet: WalletMode::default(),
            wallet_key: default_wallet_key(),
            report_interval_ms: default_report_interval_ms(),
            throttle_ms: default_throttle_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(WorkerError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, WorkerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            WorkerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&config_str)
    }

    /// Parses configuration from TOML text
    pub fn parse(config_str: &str) -> Result<Self, WorkerError> {
        Ok(toml::from_str(config_str)?)
    }

    /// Checks that every address is usable and every timing is sane
    ///
    /// Service URLs must be absolute http(s) URLs. The counter store
    /// address is only required to be non-empty; the store client
    /// decides what else it accepts.
    pub fn validate(&self) -> Result<(), WorkerError> {
        if self.counter_store_address.trim().is_empty() {
            return Err(WorkerError::ConfigError(
                "counter-store-address must not be empty".into(),
            ));
        }
        validate_service_url("randomness-url", &self.randomness_url)?;
        validate_service_url("hashing-url", &self.hashing_url)?;

        if self.counter_key.is_empty() {
            return Err(WorkerError::ConfigError(
                "counter_key must not be empty".into(),
            ));
        }
        if self.wallet_key.is_empty() {
            return Err(WorkerError::ConfigError(
                "wallet_key must not be empty".into(),
            ));
        }
        if self.report_interval_ms == 0 {
            return Err(WorkerError::ConfigError(
                "report_interval_ms must be positive".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(WorkerError::ConfigError(
                "request_timeout_ms must be positive".into(),
            ));
        }

        self.retry.validate()
    }

    /// Interval between counter flushes
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    /// Delay before each work unit
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Timeout for each remote call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    /// populated with the compiled-in defaults
    pub fn generate_template() -> String {
        let defaults = Config::default();
        let retry = &defaults.retry;
        let mut template = String::new();

        template.push_str("# Coin worker configuration\n\n");
        template.push_str("# Counter store (Redis) address, database 0, no password\n");
        template.push_str(&format!(
            "counter_store_address = \"{}\"\n",
            defaults.counter_store_address
        ));
        template.push_str("# Service answering GET with a random payload\n");
        template.push_str(&format!("randomness_url = \"{}\"\n", defaults.randomness_url));
        template.push_str("# Service answering POST <payload> with a hex digest\n");
        template.push_str(&format!("hashing_url = \"{}\"\n\n", defaults.hashing_url));

        template.push_str("# Key receiving the per-interval work count.\n");
        template.push_str("# Give each worker its own key, or use counter_mode = \"increment\"\n");
        template.push_str("# when several workers share one.\n");
        template.push_str(&format!("counter_key = \"{}\"\n", defaults.counter_key));
        template.push_str("# overwrite | increment\n");
        template.push_str(&format!("counter_mode = \"{}\"\n\n", defaults.counter_mode));

        template.push_str("# log | store (store also writes digest -> payload to wallet_key)\n");
        template.push_str(&format!("wallet = \"{}\"\n", defaults.wallet));
        template.push_str(&format!("wallet_key = \"{}\"\n\n", defaults.wallet_key));

        template.push_str(&format!(
            "report_interval_ms = {}\n",
            defaults.report_interval_ms
        ));
        template.push_str(&format!("throttle_ms = {}\n", defaults.throttle_ms));
        template.push_str(&format!(
            "request_timeout_ms = {}\n\n",
            defaults.request_timeout_ms
        ));

        template.push_str("# Failure policy for remote calls\n");
        template.push_str("[retry]\n");
        template.push_str("# fail-fast | retry\n");
        template.push_str(&format!("mode = \"{}\"\n", retry.mode));
        template.push_str(&format!("max_attempts = {}\n", retry.max_attempts));
        template.push_str(&format!("initial_backoff_ms = {}\n", retry.initial_backoff_ms));
        template.push_str(&format!("max_backoff_ms = {}\n", retry.max_backoff_ms));
        template.push_str(&format!("multiplier = {:.1}\n", retry.multiplier));

        template
    }
}

fn validate_service_url(name: &str, value: &str) -> Result<(), WorkerError> {
    if value.trim().is_empty() {
        return Err(WorkerError::ConfigError(format!(
            "{} must not be empty",
            name
        )));
    }

    let url = Url::parse(value)
        .map_err(|e| WorkerError::ConfigError(format!("Invalid {} '{}': {}", name, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(WorkerError::ConfigError(format!(
            "{} must use http or https, got '{}'",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureMode;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.counter_key, "hashes");
        assert_eq!(config.report_interval(), Duration::from_secs(1));
        assert_eq!(config.throttle(), Duration::from_millis(100));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        config.validate().unwrap();
    }

    #[test]
    fn generated_template_round_trips_to_defaults() {
        let config = Config::parse(&Config::generate_template()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            hashing_url = "http://localhost:9000/hash"
            counter_mode = "increment"

            [retry]
            mode = "fail-fast"
            "#,
        )
        .unwrap();

        assert_eq!(config.hashing_url, "http://localhost:9000/hash");
        assert_eq!(config.counter_mode, CounterMode::Increment);
        assert_eq!(config.retry.mode, FailureMode::FailFast);
        assert_eq!(config.randomness_url, "http://rng:8002/32");
        assert_eq!(config.retry.max_attempts, RetryPolicy::default().max_attempts);
    }

    #[test]
    fn rejects_unknown_enum_values() {
        let err = Config::parse("wallet = \"bank\"").unwrap_err();
        assert!(matches!(err, WorkerError::ConfigError(_)));
    }

    #[test]
    fn validate_rejects_empty_store_address() {
        let config = Config {
            counter_store_address: "  ".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WorkerError::ConfigError(msg)) if msg.contains("counter-store-address")
        ));
    }

    #[test]
    fn validate_rejects_non_http_service_urls() {
        let config = Config {
            randomness_url: "ftp://rng/32".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            hashing_url: "hasher:8003".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            hashing_url: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_intervals() {
        let config = Config {
            report_interval_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            request_timeout_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/nonexistent/coin-worker.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/coin-worker.toml"));
    }
}
