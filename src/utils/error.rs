// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the worker
///
/// Each variant maps to one failure kind the loop's failure policy
/// knows how to treat: startup connection failures and configuration
/// problems are fatal, remote-call failures are transient.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The counter store did not answer the liveness check at startup
    #[error("Counter store connection error ({store}): {reason}")]
    ConnectionError {
        /// Address of the counter store that was pinged
        store: String,
        /// Underlying failure description
        reason: String,
    },

    /// A call to the randomness or hashing service failed
    ///
    /// Covers timeouts, refused connections, DNS failures and non-2xx
    /// responses.
    #[error("Transport error calling {service}: {reason}")]
    TransportError {
        /// Name of the remote service ("randomness" or "hashing")
        service: String,
        /// Underlying failure description
        reason: String,
    },

    /// Writing the counter or a wallet entry to the counter store failed
    #[error("Counter store write error: {0}")]
    StoreWriteError(String),

    /// A remote service answered with data the worker cannot use
    #[error("Protocol violation: {0}")]
    ProtocolError(String),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl WorkerError {
    /// Builds a [`WorkerError::TransportError`] for the named service
    pub fn transport(service: impl Into<String>, reason: impl ToString) -> Self {
        WorkerError::TransportError {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this failure is expected to go away on its own
    ///
    /// Transient errors are candidates for retrying; everything else
    /// stops the worker regardless of policy.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WorkerError::TransportError { .. }
                | WorkerError::StoreWriteError(_)
                | WorkerError::ProtocolError(_)
        )
    }
}

/// Converts TOML parse errors into WorkerError
impl From<toml::de::Error> for WorkerError {
    fn from(e: toml::de::Error) -> Self {
        WorkerError::ConfigError(format!("Invalid config format: {}", e))
    }
}
