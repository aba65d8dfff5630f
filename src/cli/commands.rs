// src/cli/commands.rs
use crate::config::Config;
use crate::types::FailureMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Config file read by `start` when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "coin-worker.toml";

/// Coin worker CLI - fetch, hash, evaluate, report
#[derive(Parser, Debug)]
#[command(name = "coin-worker")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (run the worker or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the worker
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Connect to the counter store and run the work loop
    Start(StartOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for running the worker
#[derive(Parser, Debug)]
pub struct StartOptions {
    /// Path to configuration file
    /// (default: coin-worker.toml, skipped if absent)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Counter store address (overrides config)
    #[arg(long)]
    pub counter_store_address: Option<String>,

    /// Randomness service URL (overrides config)
    #[arg(long)]
    pub randomness_url: Option<String>,

    /// Hashing service URL (overrides config)
    #[arg(long)]
    pub hashing_url: Option<String>,

    /// Failure policy for remote calls (overrides config)
    #[arg(long, value_enum)]
    pub failure_policy: Option<FailureMode>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl StartOptions {
    /// Config file to read and whether it must exist
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        }
    }

    /// Applies command-line overrides on top of `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(address) = &self.counter_store_address {
            config.counter_store_address = address.clone();
        }
        if let Some(url) = &self.randomness_url {
            config.randomness_url = url.clone();
        }
        if let Some(url) = &self.hashing_url {
            config.hashing_url = url.clone();
        }
        if let Some(mode) = self.failure_policy {
            config.retry.mode = mode;
        }
    }
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(args: &[&str]) -> StartOptions {
        let argv = ["coin-worker", "start"].iter().chain(args);
        match Commands::try_parse_from(argv).unwrap().action {
            Action::Start(opts) => opts,
            other => panic!("expected start, got {:?}", other),
        }
    }

    #[test]
    fn flags_override_config_values() {
        let opts = start(&[
            "--counter-store-address",
            "localhost:6379",
            "--randomness-url",
            "http://localhost:8002/32",
            "--hashing-url",
            "http://localhost:8003/",
            "--failure-policy",
            "fail-fast",
        ]);
        let mut config = Config::default();
        opts.apply(&mut config);

        assert_eq!(config.counter_store_address, "localhost:6379");
        assert_eq!(config.randomness_url, "http://localhost:8002/32");
        assert_eq!(config.hashing_url, "http://localhost:8003/");
        assert_eq!(config.retry.mode, FailureMode::FailFast);
    }

    #[test]
    fn no_flags_keep_config_values() {
        let opts = start(&[]);
        let mut config = Config::default();
        opts.apply(&mut config);

        assert_eq!(config, Config::default());
        assert!(!opts.verbose);
    }

    #[test]
    fn explicit_config_path_is_required() {
        assert_eq!(
            start(&[]).config_path(),
            (PathBuf::from(DEFAULT_CONFIG_PATH), false)
        );
        assert_eq!(
            start(&["--config", "/etc/coin-worker.toml"]).config_path(),
            (PathBuf::from("/etc/coin-worker.toml"), true)
        );
    }

    #[test]
    fn unknown_failure_policy_is_rejected() {
        let argv = ["coin-worker", "start", "--failure-policy", "maybe"];
        assert!(Commands::try_parse_from(argv).is_err());
    }

    #[test]
    fn config_defaults_output_path() {
        match Commands::try_parse_from(["coin-worker", "config"]).unwrap().action {
            Action::Config(opts) => assert_eq!(opts.output, PathBuf::from(DEFAULT_CONFIG_PATH)),
            other => panic!("expected config, got {:?}", other),
        }
    }
}
