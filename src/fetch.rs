use crate::config::ExtractorConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Transport seam for the crawl loop.
///
/// Production code fetches over HTTP; tests substitute an in-memory
/// document set without touching the network.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch raw markup from a URL.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP fetcher backed by a shared reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the extraction configuration.
    pub fn new(config: &ExtractorConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        ::log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            ::log::error!("HTTP {} from {}", status, url);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}
