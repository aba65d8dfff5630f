// src/network/mod.rs
//! Network communication components
//!
//! This module handles every remote call the worker makes:
//! - `HttpServices`: the randomness and hashing services over HTTP
//! - `RedisStore`: the counter store

/// Randomness and hashing service client
///
/// Plain-text HTTP calls bounded by a fixed timeout.
pub mod http;

/// Counter store client
///
/// Liveness check, counter writes and wallet writes against Redis.
pub mod store;

// Re-export main components for cleaner imports
pub use http::{HttpServices, Services};
pub use store::{CounterStore, RedisStore};
