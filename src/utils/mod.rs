use std::time::{Duration, Instant};
use tracing::info;

/// Measures one named run; logs when it starts and, on drop, how long it took.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!(run = %label, "resolving");
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        info!(run = %self.label, elapsed_ms = elapsed.as_millis() as u64, "resolved");
    }
}

/// Format an integer with thousands separators.
pub fn fmt_number(n: i64) -> String {
    let s = n.abs().to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

/// Whole-dollar AUD amount: 28382.4 → "A$28,382"
pub fn format_aud(value: f64) -> String {
    let rounded = value.round() as i64;
    if rounded < 0 {
        format!("-A${}", fmt_number(-rounded))
    } else {
        format!("A${}", fmt_number(rounded))
    }
}

/// Fraction as a percentage with two decimals; non-positive values read 0.00%.
pub fn format_percent(fraction: f64) -> String {
    if !fraction.is_finite() || fraction <= 0.0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", fraction * 100.0)
}
