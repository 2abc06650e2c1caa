//! Candidate discovery through a scrape-tolerant HTML search endpoint.
//!
//! Results keep the engine's own ranking. Redirect wrappers are unwrapped,
//! `utm_*` parameters stripped, and duplicates dropped by the cleaned URL.

use crate::config::SearchConfig;
use crate::error::{ConfigError, SearchError};
use crate::scraper::http_client::HttpClient;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Result anchors: current markup first, then the legacy "lite" markup.
const RESULT_SELECTORS: [&str; 2] = ["a.result__a", "a.result-link"];

/// Query parameter carrying the destination in redirect-wrapper links.
const REDIRECT_PARAM: &str = "uddg";

const ENGINE_DOMAIN: &str = "duckduckgo.com";

// ── Source trait ──────────────────────────────────────────────────────────────

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ranked, deduplicated result URLs. A rejected query yields an empty list.
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError>;
}

// ── DuckDuckGo HTML endpoint ──────────────────────────────────────────────────

pub struct DuckDuckGoSearch {
    client: HttpClient,
    endpoint: Url,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|_| ConfigError::InvalidUrl {
            field: "search.endpoint",
            value: config.endpoint.clone(),
        })?;

        Ok(Self {
            client: HttpClient::new(&config.user_agent, Duration::from_secs(config.timeout_secs))?,
            endpoint,
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let url = Url::parse_with_params(self.endpoint.as_str(), &[("q", query)])
            .map_err(|e| SearchError::InvalidEndpoint(e.to_string()))?;

        info!("Searching: {}", query);

        let Some(html) = self.client.get_text(url).await? else {
            warn!("Search endpoint rejected query {:?}", query);
            return Ok(Vec::new());
        };

        let results = parse_results(&html, self.endpoint.host_str());
        debug!("{} search candidates", results.len());
        Ok(results)
    }
}

// ── Result parsing ────────────────────────────────────────────────────────────

/// Extract candidate URLs from a results page. `own_host` is the endpoint's
/// host, excluded along with the engine's domain.
pub fn parse_results(html: &str, own_host: Option<&str>) -> Vec<String> {
    let doc = Html::parse_document(html);

    let hrefs: Vec<String> = RESULT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .flat_map(|sel| {
            doc.select(&sel)
                .filter_map(|a| a.value().attr("href").map(str::to_string))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for href in hrefs {
        let Some(target) = decode_href(&href) else { continue };
        if !is_candidate(&target, own_host) {
            continue;
        }
        let cleaned = strip_tracking(target).to_string();
        if seen.insert(cleaned.clone()) {
            out.push(cleaned);
        }
    }

    out
}

/// Resolve an href (possibly protocol-relative or a redirect wrapper) to
/// its destination. Unparsable hrefs yield `None`.
pub fn decode_href(href: &str) -> Option<Url> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty() || lower.starts_with("mailto:") || lower.starts_with("tel:") {
        return None;
    }

    let base = Url::parse(&format!("https://{}/", ENGINE_DOMAIN)).ok()?;
    let parsed = base.join(href).ok()?;

    if let Some((_, dest)) = parsed.query_pairs().find(|(k, _)| k == REDIRECT_PARAM) {
        return Url::parse(&dest).ok();
    }

    Some(parsed)
}

fn is_candidate(url: &Url, own_host: Option<&str>) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else { return false };
    let host = host.to_ascii_lowercase();

    if host == ENGINE_DOMAIN || host.ends_with(&format!(".{}", ENGINE_DOMAIN)) {
        return false;
    }
    !own_host.is_some_and(|own| own.eq_ignore_ascii_case(&host))
}

/// Drop every `utm_*` query parameter. Kept parameters stay byte-identical.
pub fn strip_tracking(mut url: Url) -> Url {
    let Some(query) = url.query() else { return url };

    let segments: Vec<&str> = query.split('&').collect();
    let kept: Vec<&str> = segments
        .iter()
        .copied()
        .filter(|segment| {
            let key = segment.split('=').next().unwrap_or_default();
            !key.to_ascii_lowercase().starts_with("utm_")
        })
        .collect();

    if kept.len() == segments.len() {
        return url;
    }

    let rebuilt = kept.join("&");
    url.set_query((!rebuilt.is_empty()).then_some(rebuilt.as_str()));
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results_page(hrefs: &[&str]) -> String {
        let anchors: String = hrefs
            .iter()
            .map(|h| format!(r#"<div class="result"><a class="result__a" href="{h}">r</a></div>"#))
            .collect();
        format!("<html><body>{anchors}</body></html>")
    }

    #[test]
    fn test_redirect_wrapper_decoded() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.vanguard.com.au%2Fvgs%3Fa%3D1&rut=abc";
        let url = decode_href(href).unwrap();
        assert_eq!(url.as_str(), "https://www.vanguard.com.au/vgs?a=1");
    }

    #[test]
    fn test_plain_href_used_as_is() {
        let url = decode_href("https://example.com/fund").unwrap();
        assert_eq!(url.as_str(), "https://example.com/fund");
    }

    #[test]
    fn test_filters_engine_and_non_http() {
        let html = results_page(&[
            "mailto:a@b.com",
            "tel:123",
            "ftp://files.example.com/x",
            "https://duckduckgo.com/y",
            "/settings",
            "https://search.local/self",
            "https://fund.example.com/a",
        ]);
        assert_eq!(
            parse_results(&html, Some("search.local")),
            vec!["https://fund.example.com/a".to_string()]
        );
    }

    #[test]
    fn test_utm_variants_deduplicated() {
        let html = results_page(&[
            "https://fund.example.com/a?utm_source=ddg",
            "https://fund.example.com/a",
            "https://fund.example.com/b?id=7&utm_medium=x",
        ]);
        assert_eq!(
            parse_results(&html, None),
            vec![
                "https://fund.example.com/a".to_string(),
                "https://fund.example.com/b?id=7".to_string(),
            ]
        );
    }

    #[test]
    fn test_legacy_selector() {
        let html = r#"<table><tr><td><a class="result-link" href="https://old.example.com/">x</a></td></tr></table>"#;
        assert_eq!(parse_results(html, None), vec!["https://old.example.com/".to_string()]);
    }

    #[test]
    fn test_ranking_preserved() {
        let html = results_page(&["https://c.example.com/", "https://a.example.com/", "https://b.example.com/"]);
        let out = parse_results(&html, None);
        assert_eq!(out[0], "https://c.example.com/");
        assert_eq!(out[2], "https://b.example.com/");
    }

    #[test]
    fn test_strip_tracking_untouched_without_utm() {
        let url = Url::parse("https://x.com/p?b=2&a=1").unwrap();
        assert_eq!(strip_tracking(url).as_str(), "https://x.com/p?b=2&a=1");
    }

    #[test]
    fn test_strip_tracking_keeps_other_params_verbatim() {
        let url = Url::parse("https://x.com/p?q=a%20b&flag&utm_source=x").unwrap();
        assert_eq!(strip_tracking(url).as_str(), "https://x.com/p?q=a%20b&flag");
    }

    #[test]
    fn test_strip_tracking_drops_empty_query() {
        let url = Url::parse("https://x.com/p?utm_source=a&UTM_medium=b").unwrap();
        assert_eq!(strip_tracking(url).as_str(), "https://x.com/p");
    }
}
