// src/network/http.rs
//! HTTP client for the randomness and hashing services
//!
//! Both services speak plain text: the randomness service answers a
//! `GET` with an opaque payload, the hashing service answers a `POST`
//! of that payload with a hex digest.

use crate::utils::error::WorkerError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const RANDOMNESS: &str = "randomness";
const HASHING: &str = "hashing";

/// The two remote services a work unit depends on
#[async_trait]
pub trait Services: Send + Sync {
    /// Fetches one random payload
    async fn random_bytes(&self) -> Result<Vec<u8>, WorkerError>;

    /// Submits `payload` for hashing and returns the hex digest
    async fn hash(&self, payload: &[u8]) -> Result<String, WorkerError>;
}

/// [`Services`] implementation over HTTP
pub struct HttpServices {
    /// Shared client; its timeout bounds every request
    client: Client,
    randomness_url: String,
    hashing_url: String,
}

impl HttpServices {
    /// Creates a client for the two service URLs
    ///
    /// # Arguments
    /// * `randomness_url` - Endpoint answering `GET` with random bytes
    /// * `hashing_url` - Endpoint answering `POST` with a hex digest
    /// * `timeout` - Upper bound for each request, body included
    pub fn new(
        randomness_url: impl Into<String>,
        hashing_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WorkerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkerError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpServices {
            client,
            randomness_url: randomness_url.into(),
            hashing_url: hashing_url.into(),
        })
    }
}

#[async_trait]
impl Services for HttpServices {
    async fn random_bytes(&self) -> Result<Vec<u8>, WorkerError> {
        let response = self
            .client
            .get(&self.randomness_url)
            .header(CONTENT_TYPE, "text/plain")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| WorkerError::transport(RANDOMNESS, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| WorkerError::transport(RANDOMNESS, e))?;

        Ok(body.to_vec())
    }

    async fn hash(&self, payload: &[u8]) -> Result<String, WorkerError> {
        let response = self
            .client
            .post(&self.hashing_url)
            .header(CONTENT_TYPE, "text/plain")
            .body(payload.to_vec())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| WorkerError::transport(HASHING, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| WorkerError::transport(HASHING, e))?;

        let digest = body.trim_end();
        if digest.is_empty() {
            return Err(WorkerError::ProtocolError(
                "Hashing service returned an empty digest".into(),
            ));
        }

        Ok(digest.to_string())
    }
}
