pub mod cleaner;
pub mod extractor;
pub mod factsheet;
pub mod firecrawl;
pub mod http_client;

use crate::error::FetchError;
use async_trait::async_trait;

pub use self::extractor::extract_sectors;
pub use self::factsheet::find_factsheet_url;
pub use self::firecrawl::FirecrawlClient;

// ── Fetch service ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Links,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Markdown => "markdown",
            Format::Links => "links",
        }
    }
}

/// What the fetch service returns for one URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedPage {
    pub markdown: Option<String>,
    pub links: Vec<String>,
}

impl ScrapedPage {
    /// Markdown body, if there is any non-blank content.
    pub fn body(&self) -> Option<&str> {
        self.markdown.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Swappable page/document fetch service.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, formats: &[Format]) -> Result<ScrapedPage, FetchError>;
}
