//! Small text-cleaning helpers shared by the extractor and the portfolio loader.

// ── Numbers ───────────────────────────────────────────────────────────────────

/// Parse a percentage-point figure: "23.4%" → 23.4 | "23.4" → 23.4
pub fn parse_pct(s: &str) -> Option<f64> {
    let s = s.trim().replace('%', "").replace(',', "");
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "-" || s == "—" {
        return None;
    }
    s.parse().ok()
}

/// Table cell holding a sector weight → fraction. Values outside 0–100
/// (years, fund sizes) are rejected.
pub fn parse_weight_cell(s: &str) -> Option<f64> {
    let pct = parse_pct(&clean_cell(s))?;
    if !(0.0..=100.0).contains(&pct) {
        return None;
    }
    Some(pct / 100.0)
}

/// Parse a money amount: strip everything except digits, dot, minus.
/// "A$28,382" → 28382.0 | "$1,234.56" → 1234.56
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "-" || s == "—" {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().ok()
}

// ── Markdown tables ───────────────────────────────────────────────────────────

/// Strip markdown emphasis and surrounding whitespace from a table cell.
pub fn clean_cell(s: &str) -> String {
    s.trim().trim_matches(|c| c == '*' || c == '_' || c == '`').trim().to_string()
}

/// Split a markdown table row into cleaned cells.
/// Returns `None` for non-table lines and for `|---|---|` separator rows.
pub fn split_table_row(line: &str) -> Option<Vec<String>> {
    let line = line.trim();
    if !line.starts_with('|') {
        return None;
    }

    let inner = line.trim_start_matches('|').trim_end_matches('|');
    let cells: Vec<String> = inner.split('|').map(clean_cell).collect();

    let is_separator = cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':' | ' ')));
    if is_separator || cells.iter().all(|c| c.is_empty()) {
        return None;
    }

    Some(cells)
}
