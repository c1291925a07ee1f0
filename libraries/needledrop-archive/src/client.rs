//! HTTP access to the archive's search and metadata endpoints.

use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};
use crate::types::{ItemMetadata, SearchDoc, SearchEnvelope};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Fields requested for each search hit
const SEARCH_FIELDS: &str = "identifier,title,creator,date,year,subject";

/// Popularity proxy used to order pages
const SEARCH_SORT: &str = "downloads desc";

/// Low-level archive client.
///
/// Every request carries the configured timeout; non-2xx responses are
/// reported as [`ArchiveError::Status`].
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: Client,
    config: ArchiveConfig,
}

impl ArchiveClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        config.validate()?;

        let config = ArchiveConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };

        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .user_agent(format!("Needledrop/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ArchiveError::Request)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Count-only query: how many items match `query`.
    pub async fn count(&self, query: &str) -> Result<u64> {
        let url = self.config.search_url();
        debug!(url = %url, query = %query, "Estimating corpus size");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("fl", "identifier"),
                ("rows", "0"),
                ("output", "json"),
            ])
            .send()
            .await?;

        let envelope: SearchEnvelope = Self::parse(response, &url).await?;
        envelope
            .response
            .and_then(|r| r.num_found)
            .ok_or_else(|| ArchiveError::Parse("search response has no numFound".into()))
    }

    /// Fetch one page of search hits, most downloaded first.
    pub async fn search_page(&self, query: &str, rows: usize, page: u64) -> Result<Vec<SearchDoc>> {
        let url = self.config.search_url();
        let rows = rows.to_string();
        let page = page.to_string();
        debug!(url = %url, query = %query, rows = %rows, page = %page, "Fetching search page");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("fl", SEARCH_FIELDS),
                ("sort", SEARCH_SORT),
                ("rows", rows.as_str()),
                ("page", page.as_str()),
                ("output", "json"),
            ])
            .send()
            .await?;

        let envelope: SearchEnvelope = Self::parse(response, &url).await?;
        let docs = envelope.response.map(|r| r.docs).unwrap_or_default();

        debug!(results = docs.len(), "Search page fetched");
        Ok(docs)
    }

    /// Fetch full metadata (descriptive block and file list) for an item.
    pub async fn metadata(&self, identifier: &str) -> Result<ItemMetadata> {
        let url = format!("{}/{}", self.config.metadata_url(), identifier);
        debug!(url = %url, identifier = %identifier, "Fetching item metadata");

        let response = self.http.get(&url).send().await?;
        Self::parse(response, &url).await
    }

    async fn parse<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ArchiveError::Parse(format!("Failed to parse {}: {}", url, e)))
    }
}
