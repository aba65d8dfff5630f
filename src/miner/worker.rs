// src/miner/worker.rs
//! The work loop
//!
//! One worker runs one sequential loop. Each pass first checks the
//! flush deadline and writes the count of finished work units if it is
//! due, then fetches a random payload, has it hashed and evaluates the
//! digest. Remote failures go through the configured [`RetryPolicy`].

use crate::config::Config;
use crate::miner::coin::{self, Coin, Outcome};
use crate::miner::cycle::{LoopState, Phase};
use crate::miner::retry::{Attempted, RetryPolicy};
use crate::network::http::{HttpServices, Services};
use crate::network::store::{CounterStore, RedisStore};
use crate::types::{CounterMode, WalletMode};
use crate::utils::error::WorkerError;
use tokio::time::Instant;

/// What happened during one pass of the loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    /// Count written to the counter store, if a flush succeeded
    pub flushed: Option<u64>,
    /// Evaluated digest, or `None` if the work unit was skipped
    pub outcome: Option<Outcome>,
}

/// A mining worker bound to its services and counter store
pub struct Worker<S: Services, C: CounterStore> {
    /// Validated configuration, read-only after construction
    config: Config,
    /// Randomness and hashing services
    services: S,
    /// Counter store, pinged during construction
    store: C,
    /// Counter and flush deadline
    state: LoopState,
}

impl Worker<HttpServices, RedisStore> {
    /// Builds a worker against the real HTTP services and Redis store
    ///
    /// # Errors
    /// - `ConfigError` if the configuration is invalid
    /// - `ConnectionError` if the counter store is unreachable
    pub async fn connect(config: Config) -> Result<Self, WorkerError> {
        let services = HttpServices::new(
            config.randomness_url.as_str(),
            config.hashing_url.as_str(),
            config.request_timeout(),
        )?;
        let store = RedisStore::new(&config.counter_store_address, config.request_timeout())?;

        Worker::new(config, services, store).await
    }
}

impl<S: Services, C: CounterStore> Worker<S, C> {
    /// Builds a worker and pings the counter store
    ///
    /// No retry happens here: if the store does not answer, the worker
    /// is never built and the loop never starts.
    pub async fn new(config: Config, services: S, store: C) -> Result<Self, WorkerError> {
        config.validate()?;

        store.ping().await.map_err(|e| match e {
            WorkerError::ConnectionError { .. } => e,
            other => WorkerError::ConnectionError {
                store: store.address().to_string(),
                reason: other.to_string(),
            },
        })?;
        log::info!("Connected to counter store at {}", store.address());

        let state = LoopState::new(config.report_interval());
        Ok(Worker {
            config,
            services,
            store,
            state,
        })
    }

    /// Current loop state
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    fn policy(&self) -> &RetryPolicy {
        &self.config.retry
    }

    /// Runs the loop until an error the policy won't absorb
    pub async fn mine(&mut self) -> Result<(), WorkerError> {
        log::info!(
            "Mining with {} -> {}, reporting to {} every {:?} ({} policy)",
            self.config.randomness_url,
            self.config.hashing_url,
            self.store.address(),
            self.config.report_interval(),
            self.config.retry.mode
        );

        loop {
            self.pass().await?;
        }
    }

    /// Runs one pass: flush if due, then one work unit
    pub async fn pass(&mut self) -> Result<Pass, WorkerError> {
        let flushed = self.report().await?;
        let outcome = self.work_once().await?;
        if outcome.is_some() {
            self.state.record_work();
        }
        Ok(Pass { flushed, outcome })
    }

    /// Writes the pending count if the deadline has passed
    ///
    /// An overwrite is idempotent and is retried in place; once attempts
    /// run out the count stays pending for the next pass. An increment
    /// may already have been applied when it reports an error, so it is
    /// sent once and a failed flush drops its units instead of sending
    /// them again.
    ///
    /// # Returns
    /// * `Ok(Some(count))` - the count was written and reset
    /// * `Ok(None)` - nothing was due, or the write failed
    pub async fn report(&mut self) -> Result<Option<u64>, WorkerError> {
        if self.state.phase(Instant::now()) == Phase::AwaitingWork {
            return Ok(None);
        }

        let count = self.state.pending();
        log::info!("{} unit of work done, updating hash counter", count);

        let key = self.config.counter_key.as_str();
        let mode = self.config.counter_mode;
        let policy = match mode {
            CounterMode::Overwrite => self.policy().clone(),
            CounterMode::Increment => self.policy().single_attempt(),
        };
        let written = policy
            .run("counter flush", || self.store.write_counter(key, count, mode))
            .await?;

        match (written, mode) {
            (Attempted::Done(()), _) => {
                self.state.mark_flushed(Instant::now());
                Ok(Some(count))
            }
            (Attempted::Skipped(_), CounterMode::Overwrite) => {
                log::warn!("Keeping {} unflushed units for the next pass", count);
                Ok(None)
            }
            (Attempted::Skipped(_), CounterMode::Increment) => {
                log::warn!("Dropping {} units, increment may not have been applied", count);
                self.state.mark_flushed(Instant::now());
                Ok(None)
            }
        }
    }

    /// Performs one work unit
    ///
    /// # Returns
    /// * `Ok(Some(outcome))` - the digest was evaluated
    /// * `Ok(None)` - a remote call kept failing and the unit was dropped
    pub async fn work_once(&self) -> Result<Option<Outcome>, WorkerError> {
        log::info!("Doing one unit of work");
        tokio::time::sleep(self.config.throttle()).await;

        let payload = match self
            .policy()
            .run("random fetch", || self.services.random_bytes())
            .await?
        {
            Attempted::Done(payload) => payload,
            Attempted::Skipped(_) => return Ok(None),
        };

        let digest = match self
            .policy()
            .run("hash submission", || self.services.hash(&payload))
            .await?
        {
            Attempted::Done(digest) => digest,
            Attempted::Skipped(_) => return Ok(None),
        };

        let outcome = coin::evaluate(&digest, &payload);
        match &outcome {
            Outcome::NoCoin => log::info!("No coin found"),
            Outcome::Coin(coin) => self.record_coin(coin).await?,
        }
        Ok(Some(outcome))
    }

    /// Records a found coin according to the wallet mode
    ///
    /// The coin is always logged. In store mode it is also written to
    /// the wallet hash; a write that keeps failing is logged and the
    /// coin is not retried later.
    pub async fn record_coin(&self, coin: &Coin) -> Result<(), WorkerError> {
        log::info!("Coin found {}", coin.digest);
        log::debug!("Coin {} payload {}", coin.digest, coin.payload_display());

        if self.config.wallet == WalletMode::Store {
            let wallet_key = self.config.wallet_key.as_str();
            if let Attempted::Skipped(_) = self
                .policy()
                .run("wallet write", || self.store.record_coin(wallet_key, coin))
                .await?
            {
                log::error!("Coin {} was not saved to {}", coin.digest, wallet_key);
            }
        }
        Ok(())
    }
}
