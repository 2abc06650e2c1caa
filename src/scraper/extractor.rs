//! Heuristic sector-weight extraction from scraped markdown.
//!
//! Provider pages and fact sheets come back as loosely structured text. Two
//! passes run per line:
//!   1. Markdown table rows are split into cells; a cell naming a sector
//!      followed by a 0–100 weight cell yields an entry.
//!   2. Anything else goes through a loose "sector name, optional `|`/`:`,
//!      number, optional `%`" pattern, tried for every known label.
//!
//! The first weight seen for a sector wins. Output is filtered to the
//! canonical taxonomy and sorted by descending weight.

use super::cleaner::{parse_pct, parse_weight_cell, split_table_row};
use crate::models::SectorWeight;
use crate::sectors;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// One compiled pattern per known label (taxonomy first, then aliases).
static SECTOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    sectors::known_labels()
        .filter_map(|label| {
            Regex::new(&format!(
                r"(?i)(?:\|?\s*)({})\s*(?:\|?|:?)\s*(\d{{1,3}}(?:\.\d{{1,2}})?)%?",
                regex::escape(label)
            ))
            .ok()
        })
        .collect()
});

/// Collects first-seen weights keyed by normalized label.
#[derive(Default)]
struct Collector {
    entries: Vec<(String, f64)>,
}

impl Collector {
    fn record(&mut self, raw_label: &str, weight: f64) {
        let name = sectors::normalize(raw_label);
        if self.entries.iter().any(|(seen, _)| *seen == name) {
            return;
        }
        self.entries.push((name, weight));
    }

    fn finish(self) -> Vec<SectorWeight> {
        let mut out: Vec<SectorWeight> = self
            .entries
            .into_iter()
            .filter_map(|(name, weight)| {
                sectors::normalize_sector(&name).map(|sector| SectorWeight { sector, weight })
            })
            .collect();
        out.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        out
    }
}

/// Extract sector weights from markdown. An empty result means "no data",
/// not an error.
pub fn extract_sectors(text: &str) -> Vec<SectorWeight> {
    let mut collector = Collector::default();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let table_pairs = split_table_row(trimmed)
            .map(|cells| table_row_pairs(&cells))
            .unwrap_or_default();

        if !table_pairs.is_empty() {
            for (label, weight) in table_pairs {
                collector.record(&label, weight);
            }
            continue;
        }

        scan_loose(trimmed, &mut collector);
    }

    let sectors = collector.finish();
    debug!("Extracted {} sectors", sectors.len());
    sectors
}

/// Sector/weight pairs from a table row. Each sector cell is paired with the
/// first valid weight cell after it and before the next sector cell.
fn table_row_pairs(cells: &[String]) -> Vec<(String, f64)> {
    let mut pairs = Vec::new();
    let mut pending: Option<&str> = None;

    for cell in cells {
        if is_sector_label(cell) {
            pending = Some(cell);
            continue;
        }
        if let Some(label) = pending {
            if let Some(weight) = parse_weight_cell(cell) {
                pairs.push((label.to_string(), weight));
                pending = None;
            }
        }
    }

    pairs
}

fn is_sector_label(cell: &str) -> bool {
    let cell = cell.trim();
    sectors::known_labels().any(|label| label.eq_ignore_ascii_case(cell))
}

fn scan_loose(line: &str, collector: &mut Collector) {
    for pattern in SECTOR_PATTERNS.iter() {
        let Some(caps) = pattern.captures(line) else { continue };
        let (Some(label), Some(number)) = (caps.get(1), caps.get(2)) else { continue };
        let Some(pct) = parse_pct(number.as_str()) else { continue };
        if !(0.0..=100.0).contains(&pct) {
            continue;
        }
        collector.record(label.as_str(), pct / 100.0);
    }
}
