// src/utils/logging.rs
//! Logging configuration and utilities
//!
//! This module handles logging setup for the worker, including:
//! - Default level selection (info, or debug when running verbose)
//! - `RUST_LOG` overrides
//! - Custom log formatting
//!
//! Uses `env_logger` under the hood with custom formatting and filtering.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem
///
/// # Configuration
/// - Logs to stdout
/// - Default log level: Info, or Debug when `verbose` is set
/// - Custom timestamp and source location formatting
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging(verbose: bool) {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter_level(default_level(verbose));
    }

    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}

fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Creates and configures a base logger builder with common settings
///
/// # Features
/// - Custom log format including:
///   - Timestamp (seconds since epoch)
///   - Log level
///   - Module path
///   - Line number
///   - Message
/// - Output to stdout
fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(Target::Stdout);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_switches_default_to_debug() {
        assert_eq!(default_level(false), LevelFilter::Info);
        assert_eq!(default_level(true), LevelFilter::Debug);
    }

    #[test]
    fn repeated_init_does_not_panic() {
        init_logging(false);
        init_logging(true);
    }
}
