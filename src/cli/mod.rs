// src/cli/mod.rs
//! Command-line interface
//!
//! Subcommands and the flags that override the configuration file.

/// Clap definitions for every subcommand
pub mod commands;

pub use commands::{Action, Commands, ConfigOptions, StartOptions};
