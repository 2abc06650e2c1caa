//! ETF sector-breakdown lookup.
//!
//! Given a ticker or a fund page URL, the [`pipeline`] scrapes the provider
//! page, falls back to its fact sheet PDF and then to web-search candidates,
//! and extracts a sector-weight breakdown from the scraped text.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod portfolio;
pub mod registry;
pub mod scraper;
pub mod search;
pub mod sectors;
pub mod utils;

pub use error::{ConfigError, FetchError, PortfolioError, ResolveError, SearchError, StageError};
pub use models::{EtfResponse, ResolutionResult, Sector, SectorWeight, SourceAttempt, Stage};
pub use pipeline::Pipeline;
