//! Locate a fund's fact sheet (usually a PDF) from a scraped page.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

/// `[... Fact Sheet ...](target)`, also "Factsheet" and "Fact-Sheet".
static FACT_SHEET_LINK: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\[[^\]]*?fact[\s-]?sheet[^\]]*?\]\(([^)]*)\)").ok());

/// Find the most likely fact sheet URL, resolved against `base_url`.
///
/// A markdown link whose text mentions "Fact Sheet" wins outright. Otherwise
/// the highest-scoring entry of `links` is used (ties go to the earliest).
/// Unresolvable URLs are skipped, never reported.
pub fn find_factsheet_url(markdown: &str, links: &[String], base_url: &str) -> Option<String> {
    if let Some(re) = FACT_SHEET_LINK.as_ref() {
        for caps in re.captures_iter(markdown) {
            let Some(target) = caps.get(1) else { continue };
            // `(url "title")` → url
            let target = target.as_str().split_whitespace().next().unwrap_or_default();
            if let Some(resolved) = resolve(base_url, target) {
                debug!("Fact sheet link in page text: {}", resolved);
                return Some(resolved);
            }
        }
    }

    let mut best: Option<(u32, &str)> = None;
    for link in links {
        let score = score_link(link);
        if score == 0 {
            continue;
        }
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, link));
        }
    }

    let (score, link) = best?;
    let resolved = resolve(base_url, link)?;
    debug!("Fact sheet candidate {} (score {})", resolved, score);
    Some(resolved)
}

/// Heuristic score for a link being a fact sheet or product disclosure.
pub fn score_link(link: &str) -> u32 {
    let lower = link.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    let mut score = 0;

    if path.ends_with(".pdf") {
        score += 2;
    }
    if lower.contains("factsheet") || lower.contains("fact-sheet") {
        score += 5;
    }
    if lower.contains("pds") || lower.contains("product-disclosure") {
        score += 1;
    }
    if lower.contains("download") || lower.contains("resources") || lower.contains("documents") {
        score += 1;
    }

    score
}

/// Resolve `target` against `base`; only http(s) results count.
fn resolve(base: &str, target: &str) -> Option<String> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    let joined = match Url::parse(target) {
        Ok(absolute) => absolute,
        Err(_) => Url::parse(base).ok()?.join(target).ok()?,
    };
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}
