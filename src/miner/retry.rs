// src/miner/retry.rs
//! Failure policy for remote calls
//!
//! Decides, per error and attempt number, whether the loop retries the
//! same request after a delay, gives up on the current step and keeps
//! looping, or stops the worker.

use crate::types::FailureMode;
use crate::utils::error::WorkerError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Retry configuration for transient failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Fail fast, or retry with backoff
    #[serde(default)]
    pub mode: FailureMode,

    /// Total attempts per request, the first one included
    /// (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt in milliseconds
    /// (default: 200)
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound for any single delay in milliseconds
    /// (default: 5000)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Growth factor between consecutive delays
    /// (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    200
}

fn default_max_backoff_ms() -> u64 {
    5000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            mode: FailureMode::default(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

/// What the loop does with a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Wait, then issue the same request again
    Retry(Duration),
    /// Give up on this step and continue with the next pass
    Skip,
    /// Stop the worker
    Abort,
}

/// Result of running a step under the policy
#[derive(Debug)]
pub enum Attempted<T> {
    /// The step succeeded, possibly after retries
    Done(T),
    /// Attempts ran out; the last error is kept for logging
    Skipped(WorkerError),
}

impl RetryPolicy {
    /// Policy that stops on the first error of any kind
    pub fn fail_fast() -> Self {
        RetryPolicy {
            mode: FailureMode::FailFast,
            ..RetryPolicy::default()
        }
    }

    /// Same policy without in-place retries
    ///
    /// For writes that must not be repeated once they may have reached
    /// the server.
    pub fn single_attempt(&self) -> Self {
        RetryPolicy {
            max_attempts: 1,
            ..self.clone()
        }
    }

    /// Checks the policy's numbers
    pub fn validate(&self) -> Result<(), WorkerError> {
        if self.max_attempts == 0 {
            return Err(WorkerError::ConfigError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(WorkerError::ConfigError(format!(
                "retry.multiplier must be >= 1.0, got {}",
                self.multiplier
            )));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(WorkerError::ConfigError(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms".into(),
            ));
        }
        Ok(())
    }

    /// Delay after the given failed attempt (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_ms = self.initial_backoff_ms as f64 * self.multiplier.powi(exponent);
        let capped = delay_ms.min(self.max_backoff_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Chooses what to do after `attempt` failed with `error`
    pub fn decide(&self, error: &WorkerError, attempt: u32) -> Action {
        if self.mode == FailureMode::FailFast || !error.is_transient() {
            return Action::Abort;
        }
        if attempt < self.max_attempts {
            Action::Retry(self.backoff(attempt))
        } else {
            Action::Skip
        }
    }

    /// Runs `op` until it succeeds or the policy stops retrying
    ///
    /// # Returns
    /// * `Ok(Attempted::Done(value))` - `op` succeeded
    /// * `Ok(Attempted::Skipped(err))` - attempts exhausted on a transient error
    /// * `Err(WorkerError)` - the policy aborted
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<Attempted<T>, WorkerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WorkerError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match op().await {
                Ok(value) => return Ok(Attempted::Done(value)),
                Err(e) => e,
            };

            match self.decide(&error, attempt) {
                Action::Retry(delay) => {
                    log::warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what,
                        attempt,
                        self.max_attempts,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Action::Skip => {
                    log::error!("{} failed after {} attempts: {}", what, attempt, error);
                    return Ok(Attempted::Skipped(error));
                }
                Action::Abort => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn timeout() -> WorkerError {
        WorkerError::transport("hashing", "operation timed out")
    }

    #[test]
    fn backoff_grows_geometrically_and_caps() {
        let policy = RetryPolicy {
            initial_backoff_ms: 100,
            max_backoff_ms: 1000,
            multiplier: 2.0,
            ..RetryPolicy::default()
        };

        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
        assert_eq!(policy.backoff(5), Duration::from_millis(1000));
        assert_eq!(policy.backoff(60), Duration::from_millis(1000));
    }

    #[test]
    fn fail_fast_aborts_everything() {
        let policy = RetryPolicy::fail_fast();
        assert_eq!(policy.decide(&timeout(), 1), Action::Abort);
        assert_eq!(
            policy.decide(&WorkerError::StoreWriteError("down".into()), 1),
            Action::Abort
        );
    }

    #[test]
    fn retry_mode_retries_then_skips_transient_errors() {
        let policy = RetryPolicy {
            max_attempts: 3,
            ..RetryPolicy::default()
        };

        assert_eq!(policy.decide(&timeout(), 1), Action::Retry(policy.backoff(1)));
        assert_eq!(policy.decide(&timeout(), 2), Action::Retry(policy.backoff(2)));
        assert_eq!(policy.decide(&timeout(), 3), Action::Skip);
    }

    #[test]
    fn single_attempt_skips_on_first_transient_error() {
        let policy = RetryPolicy::default().single_attempt();
        assert_eq!(policy.decide(&timeout(), 1), Action::Skip);

        let strict = RetryPolicy::fail_fast().single_attempt();
        assert_eq!(strict.decide(&timeout(), 1), Action::Abort);
    }

    #[test]
    fn retry_mode_never_retries_fatal_errors() {
        let policy = RetryPolicy::default();
        let connection = WorkerError::ConnectionError {
            store: "redis:6379".into(),
            reason: "refused".into(),
        };

        assert_eq!(policy.decide(&connection, 1), Action::Abort);
        assert_eq!(
            policy.decide(&WorkerError::ConfigError("bad".into()), 1),
            Action::Abort
        );
    }

    #[test]
    fn validate_rejects_degenerate_policies() {
        let zero_attempts = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert!(zero_attempts.validate().is_err());

        let shrinking = RetryPolicy {
            multiplier: 0.5,
            ..RetryPolicy::default()
        };
        assert!(shrinking.validate().is_err());

        let inverted = RetryPolicy {
            initial_backoff_ms: 10_000,
            max_backoff_ms: 100,
            ..RetryPolicy::default()
        };
        assert!(inverted.validate().is_err());

        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn run_retries_the_same_request_until_it_succeeds() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff_ms: 100,
            ..RetryPolicy::default()
        };
        let calls = Cell::new(0);
        let started = tokio::time::Instant::now();

        let result = policy
            .run("hash submission", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { if n < 3 { Err(timeout()) } else { Ok("fabc") } }
            })
            .await
            .unwrap();

        assert!(matches!(result, Attempted::Done("fabc")));
        assert_eq!(calls.get(), 3);
        // 100ms after the first failure, 200ms after the second
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn run_skips_once_attempts_are_exhausted() {
        let policy = RetryPolicy {
            max_attempts: 2,
            ..RetryPolicy::default()
        };
        let calls = Cell::new(0);

        let result = policy
            .run("random fetch", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(timeout()) }
            })
            .await
            .unwrap();

        assert!(matches!(
            result,
            Attempted::Skipped(WorkerError::TransportError { .. })
        ));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn run_aborts_immediately_under_fail_fast() {
        let policy = RetryPolicy::fail_fast();
        let calls = Cell::new(0);

        let result = policy
            .run("hash submission", || {
                calls.set(calls.get() + 1);
                async { Err::<(), _>(timeout()) }
            })
            .await;

        assert!(matches!(result, Err(WorkerError::TransportError { .. })));
        assert_eq!(calls.get(), 1);
    }
}
