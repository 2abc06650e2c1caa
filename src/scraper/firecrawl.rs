//! Firecrawl-compatible scrape API client.
//!
//! `POST {api_base}/v1/scrape` with `{"url": ..., "formats": [...]}` returns
//! `{"success": bool, "data": {"markdown": ..., "links": [...]}}`. PDFs are
//! converted to markdown server-side, so fact sheets go through the same call.

use super::http_client::HttpClient;
use super::{Format, PageFetcher, ScrapedPage};
use crate::config::ScraperConfig;
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    #[serde(default)]
    links: Vec<String>,
}

pub struct FirecrawlClient {
    client: HttpClient,
    endpoint: Url,
    api_key: String,
}

impl FirecrawlClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        let base = format!("{}/", config.api_base.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|u| u.join("v1/scrape"))
            .map_err(|_| ConfigError::InvalidUrl {
                field: "scraper.api_base",
                value: config.api_base.clone(),
            })?;

        Ok(Self {
            client: HttpClient::new(&config.user_agent, Duration::from_secs(config.timeout_secs))?,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl PageFetcher for FirecrawlClient {
    async fn fetch(&self, url: &str, formats: &[Format]) -> Result<ScrapedPage, FetchError> {
        if Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let request = ScrapeRequest {
            url,
            formats: formats.iter().map(|f| f.as_str()).collect(),
        };

        let resp: ScrapeResponse = self
            .client
            .post_json(self.endpoint.clone(), &self.api_key, &request)
            .await?;

        if !resp.success {
            return Err(FetchError::Api(
                resp.error.unwrap_or_else(|| "scrape reported failure".to_string()),
            ));
        }

        let page = resp
            .data
            .map(|d| ScrapedPage {
                markdown: d.markdown,
                links: d.links,
            })
            .unwrap_or_default();

        debug!(
            "Scraped {}: {} chars, {} links",
            url,
            page.markdown.as_ref().map(|m| m.len()).unwrap_or(0),
            page.links.len()
        );

        Ok(page)
    }
}
