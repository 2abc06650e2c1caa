//! Portfolio holdings loaded from CSV and the value-weighted sector totals
//! across every fund that resolved.

use crate::error::PortfolioError;
use crate::models::ResolutionResult;
use crate::pipeline::batch::BatchRequest;
use crate::scraper::cleaner::parse_amount;
use crate::sectors::Sector;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

// ── Holdings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub label: Option<String>,
    pub ticker: Option<String>,
    pub url: Option<String>,
    /// Market value in AUD; no FX conversion.
    pub value: f64,
    pub enabled: bool,
}

impl Holding {
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.ticker.as_deref())
            .or(self.url.as_deref())
            .unwrap_or("?")
    }

    pub fn request(&self) -> BatchRequest {
        BatchRequest {
            ticker: self.ticker.clone(),
            url: self.url.clone(),
        }
    }
}

/// CSV columns: label, ticker, url, value, enabled. All optional.
#[derive(Debug, Default, Deserialize)]
struct RawHoldingRow {
    label: Option<String>,
    ticker: Option<String>,
    url: Option<String>,
    value: Option<String>,
    enabled: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_enabled(s: Option<&str>) -> bool {
    !matches!(
        s.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("false" | "0" | "no" | "n")
    )
}

pub fn load_holdings(path: &Path) -> Result<Vec<Holding>, PortfolioError> {
    debug!("Loading holdings from {:?}", path);
    let file = std::fs::File::open(path)?;
    let holdings = read_holdings(file)?;
    info!("{} holdings loaded from {:?}", holdings.len(), path);
    Ok(holdings)
}

/// Parse holdings CSV. Rows without a ticker or URL are skipped with a warning.
pub fn read_holdings<R: Read>(reader: R) -> Result<Vec<Holding>, PortfolioError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?;
    debug!("Holding columns: {:?}", headers);

    let mut holdings = Vec::new();

    for (i, row) in reader.deserialize::<RawHoldingRow>().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {}: {}", i + 1, e);
                continue;
            }
        };

        let ticker = non_empty(row.ticker);
        let url = non_empty(row.url);
        if ticker.is_none() && url.is_none() {
            warn!("Row {}: needs a ticker or a URL, skipped", i + 1);
            continue;
        }

        holdings.push(Holding {
            label: non_empty(row.label),
            ticker,
            url,
            value: row.value.as_deref().and_then(parse_amount).unwrap_or(0.0),
            enabled: parse_enabled(row.enabled.as_deref()),
        });
    }

    Ok(holdings)
}

// ── Aggregate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectorTotal {
    pub sector: Sector,
    pub value: f64,
    /// Share of the included portfolio value.
    pub percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PortfolioAggregate {
    pub rows: Vec<SectorTotal>,
    pub total_value: f64,
}

/// Value-weighted sector totals. Only successful results for holdings with a
/// positive value contribute; rows are sorted by descending value.
pub fn aggregate<'a, I>(items: I) -> PortfolioAggregate
where
    I: IntoIterator<Item = (&'a Holding, &'a ResolutionResult)>,
{
    let mut sums = [0.0f64; Sector::ALL.len()];
    let mut total_value = 0.0;

    for (holding, result) in items {
        if !result.success || holding.value <= 0.0 {
            continue;
        }
        total_value += holding.value;

        for datum in &result.sectors {
            if let Some(idx) = Sector::ALL.iter().position(|s| *s == datum.sector) {
                sums[idx] += holding.value * datum.weight;
            }
        }
    }

    let mut rows: Vec<SectorTotal> = Sector::ALL
        .into_iter()
        .zip(sums)
        .filter(|(_, value)| *value > 0.0)
        .map(|(sector, value)| SectorTotal {
            sector,
            value,
            percent: if total_value > 0.0 { value / total_value } else { 0.0 },
        })
        .collect();
    rows.sort_by(|a, b| b.value.total_cmp(&a.value));

    PortfolioAggregate { rows, total_value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectorWeight;

    fn holding(ticker: &str, value: f64) -> Holding {
        Holding {
            label: None,
            ticker: Some(ticker.into()),
            url: None,
            value,
            enabled: true,
        }
    }

    fn found(weights: &[(Sector, f64)]) -> ResolutionResult {
        ResolutionResult::found(
            weights
                .iter()
                .map(|(sector, weight)| SectorWeight { sector: *sector, weight: *weight })
                .collect(),
            "https://x.example/".into(),
            Vec::new(),
        )
    }

    #[test]
    fn test_read_holdings() {
        let csv = "label,ticker,url,value,enabled\n\
                   Core,VGS,,\"A$12,426\",\n\
                   ,,https://fund.example/a,100,false\n\
                   Empty,,,50,\n";
        let holdings = read_holdings(csv.as_bytes()).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].ticker.as_deref(), Some("VGS"));
        assert_eq!(holdings[0].value, 12426.0);
        assert!(holdings[0].enabled);
        assert_eq!(holdings[1].display_name(), "https://fund.example/a");
        assert!(!holdings[1].enabled);
    }

    #[test]
    fn test_aggregate_weights_by_value() {
        let a = holding("A", 100.0);
        let b = holding("B", 300.0);
        let ra = found(&[(Sector::Financials, 0.5), (Sector::Technology, 0.5)]);
        let rb = found(&[(Sector::Technology, 1.0)]);

        let agg = aggregate([(&a, &ra), (&b, &rb)]);
        assert_eq!(agg.total_value, 400.0);
        assert_eq!(agg.rows.len(), 2);
        assert_eq!(agg.rows[0].sector, Sector::Technology);
        assert!((agg.rows[0].value - 350.0).abs() < 1e-9);
        assert!((agg.rows[0].percent - 0.875).abs() < 1e-9);
        assert_eq!(agg.rows[1].sector, Sector::Financials);
    }

    #[test]
    fn test_aggregate_skips_failures_and_zero_values() {
        let a = holding("A", 0.0);
        let b = holding("B", 100.0);
        let ra = found(&[(Sector::Energy, 1.0)]);
        let rb = ResolutionResult::not_found("https://x.example/".into(), Vec::new(), "none".into());

        let agg = aggregate([(&a, &ra), (&b, &rb)]);
        assert_eq!(agg, PortfolioAggregate::default());
    }
}
