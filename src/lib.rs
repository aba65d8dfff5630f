//! Coin worker - one worker of a distributed toy proof-of-work pipeline
//!
//! The worker repeatedly:
//! - Fetches a random payload from a randomness service
//! - Has it hashed by a hashing service
//! - Treats every digest not starting with `'0'` as a coin
//! - Reports its throughput to a Redis counter once per second

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Work loop, reporting cycle, digest evaluation and failure policy
pub mod miner;

/// Clients for the remote services and the counter store
pub mod network;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use miner::{Coin, LoopState, Outcome, Pass, RetryPolicy, Worker};
pub use network::{CounterStore, HttpServices, RedisStore, Services};
pub use types::{CounterMode, FailureMode, WalletMode};
pub use utils::{WorkerError, init_logging};
