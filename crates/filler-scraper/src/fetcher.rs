//! Cached page fetching.
//!
//! A [`Fetcher`] serves fresh cache entries without touching the network,
//! refreshes stale or missing ones, and falls back to a stale copy when the
//! refresh fails.

use crate::cache::CacheStore;
use crate::error::{FetchError, ScrapeError, TransportError};
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use shared::CacheEntry;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Source of raw page bodies
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` and return the body of a 2xx response
    async fn get_text(&self, url: &str) -> Result<String, TransportError>;
}

/// HTTP transport backed by reqwest
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        debug!(url = %url, "Making request");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Fetches pages through the response cache
pub struct Fetcher {
    store: Arc<dyn CacheStore>,
    transport: Arc<dyn HttpTransport>,
    /// Pause after every successful network request
    request_delay: Duration,
}

impl Fetcher {
    pub fn new(
        store: Arc<dyn CacheStore>,
        transport: Arc<dyn HttpTransport>,
        request_delay: Duration,
    ) -> Self {
        Self {
            store,
            transport,
            request_delay,
        }
    }

    /// Get the body of `url`, at most `max_age` old if the network allows
    ///
    /// Returns the cached body while it is fresh. Otherwise the page is
    /// downloaded and written through to the cache; if the download fails,
    /// any cached body is returned instead, however old.
    pub async fn fetch(&self, url: &str, max_age: Duration) -> Result<String, ScrapeError> {
        let cached = self.store.get(url).await?;

        match &cached {
            Some(entry) if entry.is_fresh(Utc::now()) => {
                debug!(url = %url, "Cache hit (fresh)");
                return Ok(entry.data.clone());
            }
            Some(_) => info!(url = %url, "Cache hit (stale), fetching new data"),
            None => info!(url = %url, "Cache miss, fetching"),
        }

        match self.transport.get_text(url).await {
            Ok(data) => {
                sleep(self.request_delay).await;

                let entry = CacheEntry::new(url, data, Utc::now(), max_age);
                self.store.put(&entry).await?;
                debug!(url = %url, expires_at = %entry.expires_at, "Fetched and cached");

                Ok(entry.data)
            }
            Err(source) => match cached {
                Some(entry) => {
                    warn!(
                        url = %url,
                        error = %source,
                        cached_at = %entry.cached_at,
                        "Request failed, returning stale data"
                    );
                    Ok(entry.data)
                }
                None => Err(FetchError {
                    url: url.to_string(),
                    source,
                }
                .into()),
            },
        }
    }
}
