//! Error types, one enum per boundary.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Missing or invalid configuration. Fatal for the whole request.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing Firecrawl API key (set FIRECRAWL_API_KEY or scraper.api_key)")]
    MissingApiKey,
    #[error("invalid URL in {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// A single page/document fetch failed. Recovered by the pipeline.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}")]
    Status { status: StatusCode },
    #[error("scrape API error: {0}")]
    Api(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// The search endpoint could not be queried. Recovered by the pipeline.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid search endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Why one pipeline stage produced nothing. Recorded in the attempt log.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Fatal resolution errors: the request is rejected before any network call.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unknown ticker \"{0}\". Please provide a Direct URL.")]
    UnknownTicker(String),
    #[error("No URL provided.")]
    NoTarget,
    #[error("resolution task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
