//! Feature breakdown shown after slicing.

use std::fmt::Write as _;

use super::stats::{FeatureMap, FeatureStats};

/// Rows shorter than this are noise.
pub const MIN_REPORT_LENGTH_MM: f64 = 1.0;

/// Rows quicker than this are noise.
pub const MIN_REPORT_TIME_SECONDS: f64 = 5.0;

/// One reported feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub name: String,
    pub stats: FeatureStats,
    /// Share of the total productive length, 0-100.
    pub percentage: f64,
}

/// Rows worth reporting, slowest feature first.
pub fn feature_rows(stats: &FeatureMap) -> Vec<FeatureRow> {
    let total_length: f64 = stats.values().map(|s| s.length_mm).sum();

    let mut rows: Vec<FeatureRow> = stats
        .iter()
        .filter(|(_, s)| s.length_mm >= MIN_REPORT_LENGTH_MM && s.time_seconds >= MIN_REPORT_TIME_SECONDS)
        .map(|(name, s)| FeatureRow {
            name: name.clone(),
            stats: *s,
            percentage: if total_length > 0.0 {
                s.length_mm / total_length * 100.0
            } else {
                0.0
            },
        })
        .collect();

    rows.sort_by(|a, b| b.stats.time_seconds.total_cmp(&a.stats.time_seconds));
    rows
}

/// Minutes and seconds, e.g. `3m 07s`.
pub fn format_minutes(seconds: f64) -> String {
    let whole = seconds.max(0.0) as u64;
    format!("{}m {:02}s", whole / 60, whole % 60)
}

/// Render the report, or `None` when no row survives filtering.
pub fn render_feature_report(stats: &FeatureMap) -> Option<String> {
    let rows = feature_rows(stats);
    if rows.is_empty() {
        return None;
    }

    let name_width = rows
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("Feature".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<w$}  {:>9}  {:>6}  {:>10}",
        "Feature",
        "Time",
        "Share",
        "Filament",
        w = name_width
    );
    for row in &rows {
        let _ = writeln!(
            out,
            "{:<w$}  {:>9}  {:>5.1}%  {:>8.1}cm",
            row.name,
            format_minutes(row.stats.time_seconds),
            row.percentage,
            row.stats.length_mm / 10.0,
            w = name_width
        );
    }
    Some(out)
}
