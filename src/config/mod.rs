use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Page/document fetch service (Firecrawl-compatible scrape API)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Web search used for candidate discovery
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_browser_user_agent")]
    pub user_agent: String,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Upper bound on any single scrape/search call made by a stage.
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,

    /// When both a known ticker and a URL are given, use the URL.
    #[serde(default)]
    pub prefer_explicit_url: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_api_base() -> String {
    "https://api.firecrawl.dev".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "etf-sectors/0.1 (sector breakdown lookup)".to_string()
}
fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}
fn default_browser_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0 Safari/537.36"
        .to_string()
}
fn default_concurrency() -> usize {
    3
}
fn default_max_candidates() -> usize {
    5
}
fn default_stage_timeout_secs() -> u64 {
    45
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_browser_user_agent(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_candidates: default_max_candidates(),
            stage_timeout_secs: default_stage_timeout_secs(),
            prefer_explicit_url: false,
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("ETF").separator("__"))
            .build()?;

        let mut app_cfg: AppConfig = cfg.try_deserialize()?;

        if app_cfg.scraper.api_key.is_none() {
            app_cfg.scraper.api_key = std::env::var("FIRECRAWL_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty());
        }

        Ok(app_cfg)
    }
}
