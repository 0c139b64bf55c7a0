use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Listing URL to start crawling from.
    pub seed_url: String,

    /// Fixed delay in seconds applied after every pagination fetch.
    #[serde(default = "default_page_delay_secs")]
    pub page_delay_secs: u64,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of listing pages to traverse before aborting.
    /// Guards against a misbehaving site whose "Next" links loop.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum number of concurrent detail-page fetches within one listing page.
    #[serde(default = "default_detail_concurrency")]
    pub detail_concurrency: usize,

    /// Apply the pagination delay to detail fetches as well.
    ///
    /// Off by default: the source site tolerates unthrottled detail requests
    /// and the sequential reference behavior only paced pagination.
    #[serde(default)]
    pub throttle_details: bool,

    /// Endpoint the detail-page URL is rebuilt onto. The listing's row links
    /// only carry a usable query string, not a usable path.
    #[serde(default = "default_detail_base_url")]
    pub detail_base_url: String,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum total runtime in seconds for the whole extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_timeout_secs: Option<u64>,
}

/// Default value for page_delay_secs
fn default_page_delay_secs() -> u64 {
    1
}

/// Default value for request_timeout_secs
fn default_request_timeout_secs() -> u64 {
    20
}

/// Default value for max_pages
fn default_max_pages() -> usize {
    200
}

/// Default value for detail_concurrency
fn default_detail_concurrency() -> usize {
    4
}

/// Default detail-page endpoint on the source site
fn default_detail_base_url() -> String {
    "https://manage.stepmarket.org/show_accepted_label_details2.php?".to_string()
}

/// Default user agent
fn default_user_agent() -> String {
    format!("step-extract/{}", env!("CARGO_PKG_VERSION"))
}

impl ExtractorConfig {
    /// Create a new configuration with default values
    pub fn new(seed_url: &str) -> Self {
        Self {
            seed_url: seed_url.to_string(),
            page_delay_secs: default_page_delay_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_pages: default_max_pages(),
            detail_concurrency: default_detail_concurrency(),
            throttle_details: false,
            detail_base_url: default_detail_base_url(),
            user_agent: default_user_agent(),
            total_timeout_secs: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }
}
