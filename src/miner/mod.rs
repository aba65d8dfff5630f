// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components of the work loop:
//! - Digest evaluation and coin records
//! - Loop state for the timed reporting cycle
//! - Failure policy for remote calls
//! - The worker itself

/// Digest evaluation
///
/// Decides whether a digest is a coin and pairs it with its payload.
pub mod coin;

/// Reporting cycle state
///
/// Holds the iteration counter and the flush deadline.
pub mod cycle;

/// Failure policy
///
/// Retry, skip or abort decisions for failed remote calls, with
/// exponential backoff.
pub mod retry;

/// The worker and its loop
pub mod worker;

// Re-export main components for cleaner imports
pub use self::coin::{Coin, Outcome};
pub use self::cycle::{LoopState, Phase};
pub use self::retry::{Action, RetryPolicy};
pub use self::worker::{Pass, Worker};
