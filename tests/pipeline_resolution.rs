use async_trait::async_trait;
use etf_sectors::config::PipelineConfig;
use etf_sectors::pipeline::batch::{BatchRequest, run_batch};
use etf_sectors::scraper::{Format, PageFetcher, ScrapedPage};
use etf_sectors::search::SearchProvider;
use etf_sectors::{FetchError, Pipeline, ResolveError, SearchError, Sector, Stage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Fakes ─────────────────────────────────────────────────────────────────────

enum Reply {
    Page(ScrapedPage),
    Slow(Duration),
}

#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn page(mut self, url: &str, markdown: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            Reply::Page(ScrapedPage {
                markdown: Some(markdown.to_string()),
                links: links.iter().map(|l| l.to_string()).collect(),
            }),
        );
        self
    }

    fn links_only(mut self, url: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            Reply::Page(ScrapedPage {
                markdown: None,
                links: links.iter().map(|l| l.to_string()).collect(),
            }),
        );
        self
    }

    fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.pages.insert(url.to_string(), Reply::Slow(delay));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _formats: &[Format]) -> Result<ScrapedPage, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(Reply::Page(page)) => Ok(page.clone()),
            Some(Reply::Slow(delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(ScrapedPage::default())
            }
            None => Err(FetchError::Api(format!("cannot scrape {url}"))),
        }
    }
}

struct FakeSearch {
    results: Result<Vec<String>, ()>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    fn returning(urls: &[&str]) -> Self {
        Self {
            results: Ok(urls.iter().map(|u| u.to_string()).collect()),
            queries: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            results: Err(()),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.results {
            Ok(urls) => Ok(urls.clone()),
            Err(()) => Err(SearchError::InvalidEndpoint("search offline".into())),
        }
    }
}

fn pipeline(fetcher: &Arc<FakeFetcher>, search: &Arc<FakeSearch>) -> Pipeline {
    pipeline_with(fetcher, search, PipelineConfig::default())
}

fn pipeline_with(fetcher: &Arc<FakeFetcher>, search: &Arc<FakeSearch>, config: PipelineConfig) -> Pipeline {
    Pipeline::with_sources(fetcher.clone(), search.clone(), config)
}

const TARGET: &str = "https://fund.example/page";
const SECTOR_TABLE: &str = "| Sector | Weight |\n|---|---|\n| Financials | 23.4% |\n| Technology | 15.2% |";

fn stages(result: &etf_sectors::ResolutionResult) -> Vec<Stage> {
    result.attempts.iter().map(|a| a.stage).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn direct_page_with_data_returns_immediately() {
    let fetcher = Arc::new(FakeFetcher::default().page(TARGET, SECTOR_TABLE, &[]));
    let search = Arc::new(FakeSearch::returning(&["https://never.example/"]));

    let result = pipeline(&fetcher, &search).resolve(None, Some(TARGET)).await.unwrap();

    assert!(result.success);
    assert_eq!(result.source_url.as_deref(), Some(TARGET));
    assert_eq!(result.sectors[0].sector, Sector::Financials);
    assert_eq!(stages(&result), vec![Stage::Direct]);
    assert!(result.attempts[0].ok);
    assert!(search.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn factsheet_fallback_supplies_data() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page(TARGET, "Overview\n[Download Fact Sheet](docs/fs.pdf)", &[])
            .page("https://fund.example/docs/fs.pdf", "Energy 40%\nCash: 2.5", &[]),
    );
    let search = Arc::new(FakeSearch::returning(&[]));

    let result = pipeline(&fetcher, &search).resolve(None, Some(TARGET)).await.unwrap();

    assert!(result.success);
    assert_eq!(result.source_url.as_deref(), Some("https://fund.example/docs/fs.pdf"));
    assert_eq!(stages(&result), vec![Stage::Direct, Stage::Factsheet]);
    assert!(!result.attempts[0].ok);
    assert!(result.attempts[1].ok);
    assert_eq!(result.sectors.len(), 2);
}

#[tokio::test]
async fn no_content_still_tries_linked_factsheet() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .links_only(TARGET, &["/about", "/resources/vgs-factsheet.pdf"])
            .page("https://fund.example/resources/vgs-factsheet.pdf", "Materials 12%", &[]),
    );
    let search = Arc::new(FakeSearch::returning(&[]));

    let result = pipeline(&fetcher, &search).resolve(None, Some(TARGET)).await.unwrap();

    assert!(result.success);
    assert_eq!(result.attempts[0].error.as_deref(), Some("no content"));
    assert_eq!(stages(&result), vec![Stage::Direct, Stage::Factsheet]);
}

#[tokio::test]
async fn first_search_candidate_with_data_wins() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page(TARGET, "Nothing about sectors here.", &["/terms.html"])
            .page("https://cand1.example/vgs", SECTOR_TABLE, &[])
            .page("https://cand2.example/vgs", "Utilities 99%", &[]),
    );
    let search = Arc::new(FakeSearch::returning(&["https://cand1.example/vgs", "https://cand2.example/vgs"]));

    let result = pipeline(&fetcher, &search).resolve(None, Some(TARGET)).await.unwrap();

    assert!(result.success);
    assert_eq!(result.source_url.as_deref(), Some("https://cand1.example/vgs"));
    assert_eq!(stages(&result), vec![Stage::Direct, Stage::Search, Stage::Candidate]);
    assert_eq!(result.attempts[1].note.as_deref(), Some("2 candidates"));
    assert_eq!(fetcher.calls(), vec![TARGET.to_string(), "https://cand1.example/vgs".to_string()]);
}

#[tokio::test]
async fn candidate_factsheet_is_followed() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page("https://cand.example/fund", "[Fact Sheet](https://cdn.example/fs.pdf)", &[])
            .page("https://cdn.example/fs.pdf", "Industrials 30%", &[]),
    );
    let search = Arc::new(FakeSearch::returning(&["https://cand.example/fund"]));

    let result = pipeline(&fetcher, &search).resolve(None, Some(TARGET)).await.unwrap();

    assert!(result.success);
    assert_eq!(result.source_url.as_deref(), Some("https://cdn.example/fs.pdf"));
    assert_eq!(
        stages(&result),
        vec![Stage::Direct, Stage::Search, Stage::Candidate, Stage::CandidateFactsheet]
    );
}

#[tokio::test]
async fn every_stage_failing_yields_full_failed_log() {
    let fetcher = Arc::new(FakeFetcher::default());
    let search = Arc::new(FakeSearch::failing());

    let result = pipeline(&fetcher, &search).resolve(None, Some(TARGET)).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.source_url.as_deref(), Some(TARGET));
    assert_eq!(stages(&result), vec![Stage::Direct, Stage::Search]);
    assert!(result.attempts.iter().all(|a| !a.ok));
    assert!(result.attempts.iter().all(|a| a.error.is_some()));
    assert!(result.sectors.is_empty());
}

#[tokio::test]
async fn failing_candidates_are_each_logged() {
    let fetcher = Arc::new(FakeFetcher::default());
    let search = Arc::new(FakeSearch::returning(&["https://a.example/", "https://b.example/"]));

    let result = pipeline(&fetcher, &search).resolve(None, Some(TARGET)).await.unwrap();

    assert!(!result.success);
    assert_eq!(
        stages(&result),
        vec![Stage::Direct, Stage::Search, Stage::Candidate, Stage::Candidate]
    );
    assert_eq!(result.attempts[2].url, "https://a.example/");
    assert_eq!(result.attempts[3].url, "https://b.example/");
    assert_eq!(result.attempts[1].note.as_deref(), Some("2 candidates"));
    assert!(result.attempts.iter().all(|a| !a.ok));
}

#[tokio::test]
async fn candidates_are_capped_and_target_skipped() {
    let candidates: Vec<String> = (1..=8).map(|i| format!("https://c{i}.example/")).collect();
    let mut refs: Vec<&str> = vec![TARGET];
    refs.extend(candidates.iter().map(String::as_str));

    let fetcher = Arc::new(FakeFetcher::default());
    let search = Arc::new(FakeSearch::returning(&refs));

    let result = pipeline(&fetcher, &search).resolve(None, Some(TARGET)).await.unwrap();

    let tried: Vec<&str> = result
        .attempts
        .iter()
        .filter(|a| a.stage == Stage::Candidate)
        .map(|a| a.url.as_str())
        .collect();
    assert_eq!(tried, candidates[..5].iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(fetcher.calls().iter().filter(|u| *u == TARGET).count(), 1);
}

#[tokio::test]
async fn slow_stage_times_out_and_falls_through() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .slow(TARGET, Duration::from_secs(30))
            .page("https://cand.example/", "Health Care 14.1%", &[]),
    );
    let search = Arc::new(FakeSearch::returning(&["https://cand.example/"]));
    let config = PipelineConfig {
        stage_timeout_secs: 1,
        ..PipelineConfig::default()
    };

    let result = pipeline_with(&fetcher, &search, config)
        .resolve(None, Some(TARGET))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.attempts[0].error.as_deref(), Some("timed out after 1s"));
    assert_eq!(result.sectors[0].sector, Sector::HealthCare);
}

#[tokio::test]
async fn ticker_query_is_exchange_qualified() {
    let fetcher = Arc::new(FakeFetcher::default());
    let search = Arc::new(FakeSearch::returning(&[]));

    let result = pipeline(&fetcher, &search).resolve(Some("vgs.ax"), None).await.unwrap();

    assert!(!result.success);
    assert_eq!(
        fetcher.calls(),
        vec!["https://www.vanguard.com.au/personal/investments/products/VGS/overview".to_string()]
    );
    assert_eq!(
        search.queries.lock().unwrap().as_slice(),
        ["ASX:VGS ETF sector breakdown fact sheet".to_string()]
    );
}

#[tokio::test]
async fn unknown_ticker_makes_no_network_call() {
    let fetcher = Arc::new(FakeFetcher::default());
    let search = Arc::new(FakeSearch::returning(&[]));

    let err = pipeline(&fetcher, &search).resolve(Some("NOPE"), None).await.unwrap_err();

    assert!(matches!(err, ResolveError::UnknownTicker(_)));
    assert!(fetcher.calls().is_empty());
    assert!(search.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn batch_keeps_request_order() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page("https://one.example/", "Energy 10%", &[])
            .page("https://two.example/", "Cash 5%", &[]),
    );
    let search = Arc::new(FakeSearch::returning(&[]));
    let pipeline = Arc::new(pipeline(&fetcher, &search));

    let requests = vec![
        BatchRequest { ticker: None, url: Some("https://one.example/".into()) },
        BatchRequest { ticker: Some("NOPE".into()), url: None },
        BatchRequest { ticker: None, url: Some("https://two.example/".into()) },
    ];

    let outcomes = run_batch(pipeline, requests, 2).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].as_ref().unwrap().sectors[0].sector, Sector::Energy);
    assert!(matches!(outcomes[1], Err(ResolveError::UnknownTicker(_))));
    assert_eq!(outcomes[2].as_ref().unwrap().sectors[0].sector, Sector::Cash);
}
