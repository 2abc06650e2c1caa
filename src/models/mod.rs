use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
pub use crate::sectors::Sector;

// ── Sector weight ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SectorWeight {
    pub sector: Sector,
    /// Fraction of the fund, 0.234 for 23.4%.
    pub weight: f64,
}

// ── Attempt log ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Direct,
    Factsheet,
    Search,
    Candidate,
    CandidateFactsheet,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Direct => "direct",
            Stage::Factsheet => "factsheet",
            Stage::Search => "search",
            Stage::Candidate => "candidate",
            Stage::CandidateFactsheet => "candidate-factsheet",
        }
    }
}

/// One fetch made while resolving a request. Appended, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceAttempt {
    pub stage: Stage,
    pub url: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceAttempt {
    pub fn ok(stage: Stage, url: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            stage,
            url: url.into(),
            ok: true,
            note: Some(note.into()),
            error: None,
        }
    }

    /// Fetch went through but produced nothing usable.
    pub fn empty(stage: Stage, url: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            stage,
            url: url.into(),
            ok: false,
            note: Some(note.into()),
            error: None,
        }
    }

    pub fn failed(stage: Stage, url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            stage,
            url: url.into(),
            ok: false,
            note: None,
            error: Some(error.to_string()),
        }
    }
}

// ── Resolution result ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolutionResult {
    pub success: bool,
    /// Sorted by descending weight.
    pub sectors: Vec<SectorWeight>,
    /// The URL that yielded data, or the original target on failure.
    pub source_url: Option<String>,
    pub attempts: Vec<SourceAttempt>,
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl ResolutionResult {
    pub fn found(sectors: Vec<SectorWeight>, source_url: String, attempts: Vec<SourceAttempt>) -> Self {
        Self {
            success: true,
            sectors,
            source_url: Some(source_url),
            attempts,
            error: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn not_found(target_url: String, attempts: Vec<SourceAttempt>, error: String) -> Self {
        Self {
            success: false,
            sectors: Vec::new(),
            source_url: Some(target_url),
            attempts,
            error: Some(error),
            fetched_at: Utc::now(),
        }
    }
}

// ── Caller-facing response ────────────────────────────────────────────────────

/// JSON shape handed to the UI: `{success, data, sourceUrl, sources, error}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EtfResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<SectorWeight>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ResolutionResult> for EtfResponse {
    fn from(r: ResolutionResult) -> Self {
        Self {
            success: r.success,
            data: r.success.then_some(r.sectors),
            source_url: r.source_url,
            sources: r.attempts,
            error: r.error,
        }
    }
}

impl From<Result<ResolutionResult, ResolveError>> for EtfResponse {
    fn from(outcome: Result<ResolutionResult, ResolveError>) -> Self {
        match outcome {
            Ok(result) => result.into(),
            // Fatal errors carry no attempt log.
            Err(e) => Self {
                success: false,
                data: None,
                source_url: None,
                sources: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}
