//! Source resolution pipeline: ticker/URL → sector breakdown.
//!
//! ## Stages
//!
//! Run strictly in order, each only if everything before it found nothing:
//!   1. `direct`: scrape the target page and extract sectors.
//!   2. `factsheet`: follow the page's fact sheet link (usually a PDF).
//!   3. `search`: query the web for alternate pages about the fund.
//!   4. `candidate` / `candidate-factsheet`: stages 1–2 again on each of the
//!      top search results until one yields data.
//!
//! A failing stage is logged as a failed [`SourceAttempt`] and never aborts
//! the run. Only an unknown ticker or bad configuration is fatal.

pub mod batch;

use crate::config::{AppConfig, PipelineConfig};
use crate::error::{ConfigError, ResolveError, StageError};
use crate::models::{ResolutionResult, SectorWeight, SourceAttempt, Stage};
use crate::registry;
use crate::scraper::{
    FirecrawlClient, Format, PageFetcher, ScrapedPage, extract_sectors, find_factsheet_url,
};
use crate::search::{DuckDuckGoSearch, SearchProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const SEARCH_PHRASE: &str = "ETF sector breakdown fact sheet";

/// What one page-plus-factsheet pass produced.
struct PassOutcome {
    found: Option<(Vec<SectorWeight>, String)>,
    attempts: Vec<SourceAttempt>,
}

pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    search: Arc<dyn SearchProvider>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Build with the Firecrawl scraper and DuckDuckGo search. Fails if the
    /// scrape API key is missing.
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_sources(
            Arc::new(FirecrawlClient::new(&config.scraper)?),
            Arc::new(DuckDuckGoSearch::new(&config.search)?),
            config.pipeline.clone(),
        ))
    }

    pub fn with_sources(
        fetcher: Arc<dyn PageFetcher>,
        search: Arc<dyn SearchProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            search,
            config,
        }
    }

    /// Pick the URL to scrape first.
    ///
    /// A known ticker's registry URL overrides an explicit URL unless
    /// `prefer_explicit_url` is set. An unknown ticker without a URL fails.
    pub fn target_url(&self, ticker: Option<&str>, url: Option<&str>) -> Result<String, ResolveError> {
        let explicit = url.map(str::trim).filter(|u| !u.is_empty());
        let ticker = ticker.map(str::trim).filter(|t| !t.is_empty());

        if let Some(ticker) = ticker {
            match registry::lookup(ticker) {
                Some(mapped) => {
                    if let Some(explicit) = explicit {
                        if self.config.prefer_explicit_url {
                            return Ok(explicit.to_string());
                        }
                        debug!("{}: registry URL overrides {}", ticker, explicit);
                    }
                    return Ok(mapped.to_string());
                }
                None if explicit.is_none() => {
                    return Err(ResolveError::UnknownTicker(ticker.to_string()));
                }
                None => {}
            }
        }

        explicit.map(str::to_string).ok_or(ResolveError::NoTarget)
    }

    /// Resolve one ticker and/or URL to a sector breakdown.
    ///
    /// `Err` only for fatal input problems; exhausting every source is an
    /// `Ok` result with `success == false` and the full attempt log.
    pub async fn resolve(
        &self,
        ticker: Option<&str>,
        url: Option<&str>,
    ) -> Result<ResolutionResult, ResolveError> {
        let target = self.target_url(ticker, url)?;
        info!("Resolving {} via {}", ticker.unwrap_or("(url)"), target);

        let mut attempts = Vec::new();

        // ── 1–2. Direct page, then its fact sheet ─────────────────────────────
        let direct = self.page_pass(&target, Stage::Direct, Stage::Factsheet).await;
        attempts.extend(direct.attempts);
        if let Some((sectors, source_url)) = direct.found {
            return Ok(ResolutionResult::found(sectors, source_url, attempts));
        }

        // ── 3. Web search ─────────────────────────────────────────────────────
        let query = search_query(ticker, &target);
        let (candidates, search_attempt) = self.discover(&query).await;
        attempts.push(search_attempt);

        // ── 4. Candidates, in engine order ────────────────────────────────────
        let candidates = candidates
            .into_iter()
            .filter(|c| *c != target)
            .take(self.config.max_candidates);

        for candidate in candidates {
            let pass = self
                .page_pass(&candidate, Stage::Candidate, Stage::CandidateFactsheet)
                .await;
            attempts.extend(pass.attempts);
            if let Some((sectors, source_url)) = pass.found {
                return Ok(ResolutionResult::found(sectors, source_url, attempts));
            }
        }

        warn!("No sector data for {} after {} attempts", target, attempts.len());
        let error = format!(
            "Could not find sector breakdown data on the page, its linked fact sheet, \
             or web search candidates (original URL: {target})."
        );
        Ok(ResolutionResult::not_found(target, attempts, error))
    }

    /// Scrape a page, extract; if empty, try its fact sheet.
    async fn page_pass(&self, url: &str, page_stage: Stage, factsheet_stage: Stage) -> PassOutcome {
        let mut attempts = Vec::new();

        let page = match self.fetch(url, &[Format::Markdown, Format::Links]).await {
            Ok(page) => page,
            Err(e) => {
                warn!("{} {} failed: {}", page_stage.as_str(), url, e);
                attempts.push(SourceAttempt::failed(page_stage, url, e));
                return PassOutcome { found: None, attempts };
            }
        };

        let body = match page.body() {
            Some(body) => {
                let sectors = extract_sectors(body);
                if !sectors.is_empty() {
                    info!("{} {}: {} sectors", page_stage.as_str(), url, sectors.len());
                    attempts.push(SourceAttempt::ok(
                        page_stage,
                        url,
                        format!("{} sectors", sectors.len()),
                    ));
                    return PassOutcome {
                        found: Some((sectors, url.to_string())),
                        attempts,
                    };
                }
                attempts.push(SourceAttempt::empty(page_stage, url, "no sector data"));
                body
            }
            None => {
                attempts.push(SourceAttempt::failed(page_stage, url, "no content"));
                ""
            }
        };

        let Some(factsheet_url) = find_factsheet_url(body, &page.links, url) else {
            debug!("{}: no fact sheet link", url);
            return PassOutcome { found: None, attempts };
        };

        info!("Trying fact sheet {}", factsheet_url);
        let found = match self.fetch(&factsheet_url, &[Format::Markdown]).await {
            Err(e) => {
                warn!("{} {} failed: {}", factsheet_stage.as_str(), factsheet_url, e);
                attempts.push(SourceAttempt::failed(factsheet_stage, &factsheet_url, e));
                None
            }
            Ok(doc) => match doc.body().map(extract_sectors) {
                None => {
                    attempts.push(SourceAttempt::failed(factsheet_stage, &factsheet_url, "no content"));
                    None
                }
                Some(sectors) if sectors.is_empty() => {
                    attempts.push(SourceAttempt::empty(factsheet_stage, &factsheet_url, "no sector data"));
                    None
                }
                Some(sectors) => {
                    attempts.push(SourceAttempt::ok(
                        factsheet_stage,
                        &factsheet_url,
                        format!("{} sectors", sectors.len()),
                    ));
                    Some((sectors, factsheet_url))
                }
            },
        };

        PassOutcome { found, attempts }
    }

    /// Run the web search. The attempt is never `ok`; `ok` is reserved for
    /// attempts that produced sectors.
    async fn discover(&self, query: &str) -> (Vec<String>, SourceAttempt) {
        let limit = self.stage_timeout();
        let result = match tokio::time::timeout(limit, self.search.search(query)).await {
            Ok(Ok(candidates)) => Ok(candidates),
            Ok(Err(e)) => Err(StageError::from(e)),
            Err(_) => Err(StageError::Timeout(limit)),
        };

        match result {
            Ok(candidates) => {
                let note = format!("{} candidates", candidates.len());
                (candidates, SourceAttempt::empty(Stage::Search, query, note))
            }
            Err(e) => {
                warn!("search failed: {}", e);
                (Vec::new(), SourceAttempt::failed(Stage::Search, query, e))
            }
        }
    }

    async fn fetch(&self, url: &str, formats: &[Format]) -> Result<ScrapedPage, StageError> {
        let limit = self.stage_timeout();
        match tokio::time::timeout(limit, self.fetcher.fetch(url, formats)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StageError::Timeout(limit)),
        }
    }

    fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.config.stage_timeout_secs)
    }
}

/// "ASX:VGS ETF sector breakdown fact sheet", or the target's host when no
/// ticker was given.
pub fn search_query(ticker: Option<&str>, target_url: &str) -> String {
    match ticker.map(str::trim).filter(|t| !t.is_empty()) {
        Some(ticker) => format!("{} {}", registry::exchange_qualified(ticker), SEARCH_PHRASE),
        None => {
            let host = Url::parse(target_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| target_url.to_string());
            format!("{} {}", host, SEARCH_PHRASE)
        }
    }
}
