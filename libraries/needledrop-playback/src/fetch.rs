//! Fetching encoded audio bytes

use crate::error::{PlaybackError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Source of encoded audio bytes
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Fetch the full encoded file at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches audio over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests abort after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Needledrop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlaybackError::Fetch(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl AudioFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "Fetching audio");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PlaybackError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::Fetch(format!("HTTP {} for {url}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlaybackError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
