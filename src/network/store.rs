// src/network/store.rs
//! Counter store client
//!
//! The counter store is a Redis instance. The worker only pings it at
//! startup, writes the per-interval work count and, in store wallet
//! mode, records coins into a hash. It never reads.

use crate::miner::coin::Coin;
use crate::types::CounterMode;
use crate::utils::error::WorkerError;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisResult};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

/// Operations the worker performs against the counter store
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Address used in log lines and error messages
    fn address(&self) -> &str;

    /// Liveness check (`PING`) run once at construction
    async fn ping(&self) -> Result<(), WorkerError>;

    /// Writes `count` under `key`
    async fn write_counter(
        &self,
        key: &str,
        count: u64,
        mode: CounterMode,
    ) -> Result<(), WorkerError>;

    /// Records a coin as `digest -> payload` in the hash at `wallet_key`
    async fn record_coin(&self, wallet_key: &str, coin: &Coin) -> Result<(), WorkerError>;
}

/// Redis-backed [`CounterStore`]
///
/// The connection is opened by the first ping and dropped after any
/// failed command, so the next call reconnects.
pub struct RedisStore {
    /// Address as configured
    address: String,
    client: redis::Client,
    /// Lazily opened connection handle
    connection: Mutex<Option<MultiplexedConnection>>,
    /// Bound for connecting and for each command
    timeout: Duration,
}

/// Turns a bare `host:port` into a Redis URL on database 0
///
/// Addresses that already carry a scheme are used unchanged.
pub fn redis_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("redis://{}/0", address)
    }
}

/// Runs a Redis future under `timeout`, flattening both failure kinds
async fn bounded<T>(
    timeout: Duration,
    fut: impl Future<Output = RedisResult<T>>,
) -> Result<T, String> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {:?}", timeout)),
    }
}

impl RedisStore {
    /// Creates a store client without touching the network
    ///
    /// # Errors
    /// Returns `WorkerError::ConnectionError` if the address is not a
    /// usable Redis address
    pub fn new(address: &str, timeout: Duration) -> Result<Self, WorkerError> {
        let client = redis::Client::open(redis_url(address)).map_err(|e| {
            WorkerError::ConnectionError {
                store: address.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(RedisStore {
            address: address.to_string(),
            client,
            connection: Mutex::new(None),
            timeout,
        })
    }

    /// Returns the open connection, opening one if needed
    async fn connection(&self) -> Result<MultiplexedConnection, String> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = bounded(self.timeout, self.client.get_multiplexed_async_connection()).await?;
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Forgets the current connection after a failure
    async fn reset(&self) {
        *self.connection.lock().await = None;
    }

    async fn write<F, Fut>(&self, what: &str, command: F) -> Result<(), WorkerError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = RedisResult<()>>,
    {
        let result = match self.connection().await {
            Ok(conn) => bounded(self.timeout, command(conn)).await,
            Err(e) => Err(e),
        };

        if let Err(reason) = result {
            self.reset().await;
            return Err(WorkerError::StoreWriteError(format!(
                "{} on {}: {}",
                what, self.address, reason
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    fn address(&self) -> &str {
        &self.address
    }

    async fn ping(&self) -> Result<(), WorkerError> {
        let result = match self.connection().await {
            Ok(mut conn) => {
                bounded(self.timeout, async move {
                    let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
                    Ok::<_, redis::RedisError>(pong)
                })
                .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => Ok(()),
            Err(reason) => {
                self.reset().await;
                Err(WorkerError::ConnectionError {
                    store: self.address.clone(),
                    reason,
                })
            }
        }
    }

    async fn write_counter(
        &self,
        key: &str,
        count: u64,
        mode: CounterMode,
    ) -> Result<(), WorkerError> {
        self.write("counter write", |mut conn| async move {
            match mode {
                CounterMode::Overwrite => {
                    let _: () = conn.set(key, count).await?;
                }
                CounterMode::Increment => {
                    let _: i64 = conn.incr(key, count).await?;
                }
            }
            Ok::<(), redis::RedisError>(())
        })
        .await
    }

    async fn record_coin(&self, wallet_key: &str, coin: &Coin) -> Result<(), WorkerError> {
        self.write("wallet write", |mut conn| async move {
            let _: () = conn
                .hset(wallet_key, coin.digest.as_str(), coin.payload.as_slice())
                .await?;
            Ok::<(), redis::RedisError>(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn bare_address_gets_scheme_and_database() {
        assert_eq!(redis_url("redis:6379"), "redis://redis:6379/0");
        assert_eq!(redis_url("127.0.0.1:6380"), "redis://127.0.0.1:6380/0");
    }

    #[test]
    fn full_url_is_kept() {
        assert_eq!(redis_url("redis://cache:6379/2"), "redis://cache:6379/2");
        assert_eq!(redis_url("rediss://cache:6380"), "rediss://cache:6380");
    }

    #[test]
    fn unusable_address_is_a_connection_error() {
        let err = RedisStore::new("http://not-redis/", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            WorkerError::ConnectionError { ref store, .. } if store == "http://not-redis/"
        ));
    }

    #[tokio::test]
    async fn ping_against_closed_port_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let store = RedisStore::new(&address, Duration::from_secs(2)).unwrap();
        let err = store.ping().await.unwrap_err();
        assert!(matches!(
            err,
            WorkerError::ConnectionError { ref store, .. } if *store == address
        ));
    }

    #[tokio::test]
    async fn write_against_closed_port_is_a_store_write_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let store = RedisStore::new(&address, Duration::from_secs(2)).unwrap();
        let err = store
            .write_counter("hashes", 3, CounterMode::Overwrite)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::StoreWriteError(_)));
    }
}
