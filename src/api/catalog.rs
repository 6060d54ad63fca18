//! iptv-org catalog client
//!
//! Fetches the public channels and streams directories as JSON arrays.
//! Fetching fails soft: callers get an empty collection when the catalog
//! cannot be retrieved, which they treat as "data unavailable".

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Catalog, Channel, Stream};

/// Default channels directory
pub const CHANNELS_URL: &str = "https://iptv-org.github.io/api/channels.json";
/// Default streams directory
pub const STREAMS_URL: &str = "https://iptv-org.github.io/api/streams.json";

/// Catalog fetch error types
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Catalog returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON array")]
    NotAnArray,
}

/// iptv-org catalog client
pub struct CatalogClient {
    channels_url: String,
    streams_url: String,
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a client for the public iptv-org directory
    pub fn new() -> Self {
        Self::with_urls(CHANNELS_URL, STREAMS_URL)
    }

    /// Create a client with custom catalog URLs (config overrides, tests)
    pub fn with_urls(channels_url: impl Into<String>, streams_url: impl Into<String>) -> Self {
        Self {
            channels_url: channels_url.into(),
            streams_url: streams_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Bound every request by `timeout`
    ///
    /// If the HTTP client can't be built the current one is kept, unbounded.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(e) => warn!(error = %e, ?timeout, "cannot apply fetch timeout"),
        }
        self
    }

    pub fn channels_url(&self) -> &str {
        &self.channels_url
    }

    pub fn streams_url(&self) -> &str {
        &self.streams_url
    }

    /// Fetch the channel list, or an empty list if unavailable
    pub async fn fetch_channels(&self) -> Vec<Channel> {
        soften("channels", self.try_fetch_channels().await)
    }

    /// Fetch the stream list, or an empty list if unavailable
    pub async fn fetch_streams(&self) -> Vec<Stream> {
        soften("streams", self.try_fetch_streams().await)
    }

    /// Fetch both collections
    pub async fn fetch_catalog(&self) -> Catalog {
        let channels = self.fetch_channels().await;
        let streams = self.fetch_streams().await;
        Catalog { channels, streams }
    }

    pub async fn try_fetch_channels(&self) -> Result<Vec<Channel>, CatalogError> {
        self.fetch_array(&self.channels_url).await
    }

    pub async fn try_fetch_streams(&self) -> Result<Vec<Stream>, CatalogError> {
        self.fetch_array(&self.streams_url).await
    }

    /// Fetch a JSON array, skipping entries that don't fit `T`
    async fn fetch_array<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, CatalogError> {
        debug!(url, "fetching catalog");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus(status.as_u16()));
        }

        let text = response.text().await?;
        parse_array(&text)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a JSON array body, dropping malformed entries
pub fn parse_array<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let serde_json::Value::Array(items) = value else {
        return Err(CatalogError::NotAnArray);
    };

    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if parsed.len() < total {
        debug!(skipped = total - parsed.len(), total, "skipped malformed catalog entries");
    }

    Ok(parsed)
}

fn soften<T>(what: &str, result: Result<Vec<T>, CatalogError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(catalog = what, error = %e, "error fetching data");
            Vec::new()
        }
    }
}
