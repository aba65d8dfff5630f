// src/config/mod.rs
//! Configuration management for the coin worker
//!
//! This module handles all configuration-related functionality including:
//! - Loading and parsing configuration files
//! - Falling back to compiled-in defaults
//! - Generating configuration templates
//!
//! The configuration uses TOML format. Command-line flags are applied on
//! top of it by the entry point.

/// Core configuration implementation
///
/// Contains the [`Config`] struct that defines the worker's collaborator
/// addresses, timing and failure settings.
pub mod config;

// Re-export key items for easy access
pub use config::Config;

use crate::utils::error::WorkerError;
use std::path::Path;

/// Loads worker configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file
/// * `required` - Whether a missing file is an error
///
/// # Returns
/// * `Ok(Config)` - Loaded configuration, or the defaults when the file
///   is absent and not required
/// * `Err(WorkerError)` - If the file couldn't be read or parsed
pub fn load(path: &Path, required: bool) -> Result<Config, WorkerError> {
    if !required && !path.exists() {
        log::debug!(
            "No config file at {}, using built-in defaults",
            path.display()
        );
        return Ok(Config::default());
    }
    Config::load(path)
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_missing_file_falls_back_to_defaults() {
        let config = load(Path::new("/nonexistent/coin-worker.toml"), false).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn required_missing_file_is_an_error() {
        let err = load(Path::new("/nonexistent/coin-worker.toml"), true).unwrap_err();
        assert!(matches!(err, WorkerError::ConfigError(_)));
    }

    #[test]
    fn reads_existing_file() {
        let path = std::env::temp_dir().join(format!(
            "coin-worker-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "counter_key = \"hashes:worker-1\"\n").unwrap();

        let config = load(&path, true).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.counter_key, "hashes:worker-1");
    }
}
