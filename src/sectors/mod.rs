//! Canonical sector taxonomy and the alias table used to fold provider
//! labels ("Information Technology", "Consumer Cyclical", ...) onto it.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Taxonomy ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Technology,
    #[serde(rename = "Consumer Discretionary")]
    ConsumerDiscretionary,
    Communications,
    Materials,
    Industrials,
    #[serde(rename = "Health Care")]
    HealthCare,
    #[serde(rename = "Consumer Staples")]
    ConsumerStaples,
    Financials,
    Utilities,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Energy,
    Cash,
}

impl Sector {
    /// All canonical sectors, in display order.
    pub const ALL: [Sector; 12] = [
        Sector::Technology,
        Sector::ConsumerDiscretionary,
        Sector::Communications,
        Sector::Materials,
        Sector::Industrials,
        Sector::HealthCare,
        Sector::ConsumerStaples,
        Sector::Financials,
        Sector::Utilities,
        Sector::RealEstate,
        Sector::Energy,
        Sector::Cash,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::ConsumerDiscretionary => "Consumer Discretionary",
            Sector::Communications => "Communications",
            Sector::Materials => "Materials",
            Sector::Industrials => "Industrials",
            Sector::HealthCare => "Health Care",
            Sector::ConsumerStaples => "Consumer Staples",
            Sector::Financials => "Financials",
            Sector::Utilities => "Utilities",
            Sector::RealEstate => "Real Estate",
            Sector::Energy => "Energy",
            Sector::Cash => "Cash",
        }
    }

    /// Case-insensitive lookup against the canonical labels only.
    pub fn from_label(s: &str) -> Option<Sector> {
        let s = s.trim();
        Sector::ALL
            .into_iter()
            .find(|sector| sector.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Aliases ───────────────────────────────────────────────────────────────────

/// Provider label → canonical label. Many-to-one; order is significant for
/// the extractor, which tries names in this order after the taxonomy.
/// "Others" deliberately maps outside the taxonomy and is dropped later.
pub const SECTOR_ALIASES: &[(&str, &str)] = &[
    ("Information Technology", "Technology"),
    ("Tech", "Technology"),
    ("Consumer Cyclical", "Consumer Discretionary"),
    ("Communication Services", "Communications"),
    ("Telecommunications", "Communications"),
    ("Basic Materials", "Materials"),
    ("Industrial", "Industrials"),
    ("Healthcare", "Health Care"),
    ("Consumer Defensive", "Consumer Staples"),
    ("Financial Services", "Financials"),
    ("Real Estate", "Real Estate"),
    ("Energy", "Energy"),
    ("Utilities", "Utilities"),
    ("Cash", "Cash"),
    ("Liquidity", "Cash"),
    ("Others", "Others"),
];

/// Every label the extractor searches for: the taxonomy followed by alias keys.
pub fn known_labels() -> impl Iterator<Item = &'static str> {
    Sector::ALL
        .into_iter()
        .map(Sector::label)
        .chain(SECTOR_ALIASES.iter().map(|(alias, _)| *alias))
}

// ── Normalizer ────────────────────────────────────────────────────────────────

/// Map a raw sector label onto the canonical taxonomy.
///
/// First match wins: exact alias, case-insensitive alias, case-insensitive
/// canonical label. Anything else comes back trimmed but otherwise unchanged,
/// so callers must still filter against [`Sector::ALL`].
pub fn normalize(raw: &str) -> String {
    let cleaned = raw.trim();

    if let Some((_, canonical)) = SECTOR_ALIASES.iter().find(|(alias, _)| *alias == cleaned) {
        return canonical.to_string();
    }

    if let Some((_, canonical)) = SECTOR_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(cleaned))
    {
        return canonical.to_string();
    }

    match Sector::from_label(cleaned) {
        Some(sector) => sector.label().to_string(),
        None => cleaned.to_string(),
    }
}

/// [`normalize`], then keep the result only if it is a canonical sector.
pub fn normalize_sector(raw: &str) -> Option<Sector> {
    Sector::from_label(&normalize(raw))
}
