//! Archive endpoint and sourcing configuration

use crate::error::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the archive lives and how hard to lean on it.
///
/// Every endpoint is derived from `base_url`, so pointing the whole provider
/// at a mock server only needs one field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; a request running longer is aborted and failed
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Simultaneous metadata requests while hydrating a crate
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Extra rows fetched per page to absorb dedup and hydration losses
    #[serde(default = "default_page_margin")]
    pub page_margin: usize,

    /// Deepest page a random pick may land on
    #[serde(default = "default_max_page")]
    pub max_page: u64,

    /// Corpus size assumed when the count query fails
    #[serde(default = "default_fallback_corpus_size")]
    pub fallback_corpus_size: u64,
}

impl ArchiveConfig {
    /// Configuration for the archive at `base_url`, other settings default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/advancedsearch.php", self.base())
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/metadata", self.base())
    }

    pub fn download_url(&self) -> String {
        format!("{}/download", self.base())
    }

    pub fn image_service_url(&self) -> String {
        format!("{}/services/img", self.base())
    }

    pub fn details_url(&self) -> String {
        format!("{}/details", self.base())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ArchiveError::InvalidUrl("URL cannot be empty".into()));
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ArchiveError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ArchiveError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        if self.concurrency == 0 {
            return Err(ArchiveError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }

        Ok(())
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// Default values
fn default_base_url() -> String {
    "https://archive.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_concurrency() -> usize {
    5
}

fn default_page_margin() -> usize {
    10
}

fn default_max_page() -> u64 {
    50
}

fn default_fallback_corpus_size() -> u64 {
    1000
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            page_margin: default_page_margin(),
            max_page: default_max_page(),
            fallback_corpus_size: default_fallback_corpus_size(),
        }
    }
}
