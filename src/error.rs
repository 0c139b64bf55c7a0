use thiserror::Error;

/// Top-level error for a full extraction run.
///
/// The caller receives either a complete dataset or exactly one of these;
/// there is no partial-result state.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// Pagination kept yielding "Next" links past the configured bound.
    #[error("page limit of {limit} reached; pagination may be looping")]
    PageLimit { limit: usize },

    /// The whole operation exceeded the configured total timeout.
    #[error("extraction timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Network-level failures while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request failed before a response arrived (connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// The fetched markup did not have the expected shape.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A listing page carried no table rows at all.
    #[error("listing page {url} contains no table rows")]
    NoListingRows { url: String },
}

/// The scraped rows cannot be projected into the canonical dataset shape.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no rows were scraped; cannot build dataset")]
    Empty,

    /// A canonical column is missing from every scraped row.
    #[error("column '{column}' is missing from every scraped row")]
    MissingColumn { column: String },
}
