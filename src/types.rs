// src/types.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the work loop reacts to a failing remote dependency
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    /// Any error stops the worker immediately
    ///
    /// The count accumulated since the last flush is lost.
    #[clap(name = "fail-fast")]
    FailFast,

    /// Transient errors are retried with exponential backoff
    ///
    /// Once attempts run out the failed step is skipped and the loop
    /// keeps going. Startup and configuration errors stay fatal.
    #[default]
    #[clap(name = "retry")]
    Retry,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMode::FailFast => write!(f, "fail-fast"),
            FailureMode::Retry => write!(f, "retry"),
        }
    }
}

impl FromStr for FailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(FailureMode::FailFast),
            "retry" => Ok(FailureMode::Retry),
            _ => Err(format!("Unknown failure mode: {}", s)),
        }
    }
}

/// How a flush writes the iteration count to the counter store
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterMode {
    /// `SET key count`: the key holds this worker's last interval only
    #[default]
    Overwrite,

    /// `INCRBY key count`: workers sharing a key aggregate atomically
    Increment,
}

impl fmt::Display for CounterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterMode::Overwrite => write!(f, "overwrite"),
            CounterMode::Increment => write!(f, "increment"),
        }
    }
}

/// Where found coins go
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletMode {
    /// Coins are only logged
    #[default]
    Log,

    /// Coins are logged and written to a hash in the counter store
    Store,
}

impl fmt::Display for WalletMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletMode::Log => write!(f, "log"),
            WalletMode::Store => write!(f, "store"),
        }
    }
}
