//! Page fetching.
//!
//! The coordinator only ever sees the [`Fetcher`] trait; transport details
//! (TLS, compression, timeouts) stay behind it. Tests substitute an in-memory
//! implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// A retrieved page, not yet parsed.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL of the page, after any redirects
    pub url: String,
    /// Raw HTML body
    pub html: String,
}

/// Asynchronous page source.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single page, or fail with a transient fetch error.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// HTTP fetcher backed by a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured user agent and timeout.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let final_url = response.url().to_string();
        let html = response.text().await?;
        Ok(FetchedPage {
            url: final_url,
            html,
        })
    }
}
