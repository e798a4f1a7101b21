//! Shared utilities for report generation.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use polars::prelude::*;
use rand::prelude::*;

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Cell values treated as missing when loading a CSV (compared lowercase).
pub const NA_MARKERS: [&str; 15] = [
    "", "#n/a", "#n/a n/a", "#na", "-1.#ind", "-1.#qnan", "-nan", "1.#ind", "1.#qnan", "<na>",
    "n/a", "na", "null", "nan", "none",
];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// # Example
///
/// ```rust,ignore
/// use data_insight::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// assert_eq!(clean_numeric_string("  42%  "), "42");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a raw CSV cell denotes a missing value.
///
/// # Example
///
/// ```rust,ignore
/// use data_insight::utils::is_missing_marker;
///
/// assert!(is_missing_marker(""));
/// assert!(is_missing_marker("N/A"));
/// assert!(!is_missing_marker("42"));
/// ```
pub fn is_missing_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    NA_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a finite numeric value (f64).
///
/// Handles common formatting like currency symbols, percentages, and thousands separators.
/// Infinite and NaN values are rejected so they count as missing.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check if a string can be parsed as a numeric value.
pub fn is_numeric_string(s: &str) -> bool {
    parse_numeric_string(s).is_some()
}

// =============================================================================
// Series Utilities
// =============================================================================

/// Collect a deterministic random sample of non-null string values.
///
/// Used by type inference so that a column's leading rows do not dominate
/// the decision.
pub fn collect_sample_values(series: &Series, max_samples: usize, seed: u64) -> Vec<String> {
    let non_null = series.drop_nulls();
    let Ok(values) = non_null.str() else {
        return Vec::new();
    };
    if values.is_empty() {
        return Vec::new();
    }

    let sample_size = std::cmp::min(max_samples, values.len());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, values.len(), sample_size).into_vec();
    indices.sort_unstable();

    indices
        .into_iter()
        .filter_map(|idx| values.get(idx).map(str::to_string))
        .collect()
}

/// Extract the non-null values of a Float64 series.
pub fn finite_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let values = series.f64()?;
    Ok(values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect())
}

// =============================================================================
// Formatting Utilities
// =============================================================================

/// Round a value to a fixed number of decimals for display.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Shorten a label to at most `max_chars` characters, appending an ellipsis.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

// =============================================================================
// Tests
// =============================================================================
