// src/utils/mod.rs
//! Utilities module for common functionality
//!
//! This module contains shared utilities used throughout the worker,
//! including error handling and logging infrastructure.

/// Error types and handling utilities
///
/// Contains the [`WorkerError`] enum which defines all failure kinds
/// the worker distinguishes, along with conversion implementations.
pub mod error;

/// Logging configuration and utilities
pub mod logging;

// Re-export for easier access
pub use error::WorkerError;
pub use logging::init_logging;
