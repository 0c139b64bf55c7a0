// Re-export modules
pub mod builder;
pub mod config;
pub mod crawlers;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod parsers;

// Re-export commonly used types for convenience
pub use dataset::{Dataset, DatasetRow, DetailAttributes, RawRow};
pub use error::ExtractError;

use crate::config::ExtractorConfig;
use crate::fetch::{Fetch, HttpFetcher};
use std::sync::Arc;
use std::time::Duration;

/// Builder for a full listing-to-dataset extraction run.
///
/// Crawls the paginated listing from the seed URL, enriches every row from
/// its detail page, and returns the derived, column-ordered, sorted dataset.
pub struct Extraction {
    config: ExtractorConfig,
}

impl Extraction {
    /// Create a new extraction starting from the given listing URL
    pub fn new(seed_url: &str) -> Self {
        Self {
            config: ExtractorConfig::new(seed_url),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(
        mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        self.config = ExtractorConfig::from_file(path)?;
        Ok(self)
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(mut self, json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        self.config = ExtractorConfig::from_json(json)?;
        Ok(self)
    }

    /// Set the delay between pagination fetches, in seconds
    pub fn with_page_delay(mut self, seconds: u64) -> Self {
        self.config.page_delay_secs = seconds;
        self
    }

    /// Set the maximum number of listing pages to traverse
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the number of concurrent detail-page fetches per listing page
    pub fn with_detail_concurrency(mut self, concurrency: usize) -> Self {
        self.config.detail_concurrency = concurrency;
        self
    }

    /// Apply the pagination delay to detail fetches as well
    pub fn with_throttled_details(mut self, throttle: bool) -> Self {
        self.config.throttle_details = throttle;
        self
    }

    /// Set the total timeout (maximum runtime) in seconds
    pub fn with_total_timeout(mut self, seconds: u64) -> Self {
        self.config.total_timeout_secs = Some(seconds);
        self
    }

    /// Run the crawl and build the final dataset.
    pub async fn run(self) -> Result<Dataset, ExtractError> {
        let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(&self.config)?);
        self.run_with_fetcher(fetcher).await
    }

    /// Run against a custom transport.
    ///
    /// Used by tests and by embedders that already own an HTTP layer.
    pub async fn run_with_fetcher(self, fetcher: Arc<dyn Fetch>) -> Result<Dataset, ExtractError> {
        let crawl = crawlers::web::crawl(fetcher, &self.config);

        let rows = match self.config.total_timeout_secs {
            Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), crawl)
                .await
                .map_err(|_| ExtractError::Timeout { seconds })??,
            None => crawl.await?,
        };

        Ok(builder::build(rows)?)
    }
}
