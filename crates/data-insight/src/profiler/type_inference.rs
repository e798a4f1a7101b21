//! Type inference logic for column analysis.

use crate::types::ColumnKind;
use crate::utils::{collect_sample_values, is_numeric_string};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;

/// Share of parseable values required to call a column numeric.
const NUMERIC_THRESHOLD: f64 = 0.9;
/// Relaxed threshold used when the column name suggests a quantity.
const NUMERIC_THRESHOLD_BY_NAME: f64 = 0.7;
/// Share of date-like samples required to call a column datetime.
const DATETIME_THRESHOLD: f64 = 0.7;
const DATETIME_SAMPLE_SIZE: usize = 100;
const TEXT_UNIQUE_RATIO: f64 = 0.7;
const TEXT_AVG_LENGTH: f64 = 30.0;

// Date pattern regexes - compiled once at startup
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: datetime"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: ISO"),
    ]
});

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y",
];

const NUMERIC_NAME_HINTS: [&str; 15] = [
    "quantity", "price", "amount", "cost", "total", "value", "sum", "count", "number", "int",
    "float", "score", "rating", "percent", "percentage",
];

/// Infer the semantic kind of a raw string column.
///
/// Checks run in order: numeric, datetime, text, categorical. A column with
/// no non-missing values is categorical.
pub(crate) fn infer_column_kind(series: &Series, seed: u64) -> PolarsResult<ColumnKind> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(ColumnKind::Categorical);
    }
    let values = non_null.str()?;

    if is_numeric_column(series.name().as_str(), values) {
        return Ok(ColumnKind::Numeric);
    }

    let samples = collect_sample_values(series, DATETIME_SAMPLE_SIZE, seed);
    if is_datetime_column(&samples) {
        return Ok(ColumnKind::Datetime);
    }

    if is_text_column(values) {
        return Ok(ColumnKind::Text);
    }

    Ok(ColumnKind::Categorical)
}

fn name_suggests_numeric(name: &str) -> bool {
    let lower = name.to_lowercase();
    NUMERIC_NAME_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Numeric when enough non-missing values parse as finite numbers.
pub(crate) fn is_numeric_column(name: &str, values: &StringChunked) -> bool {
    let mut total = 0usize;
    let mut numeric = 0usize;
    for value in values.into_iter().flatten() {
        total += 1;
        if is_numeric_string(value) {
            numeric += 1;
        }
    }
    if total == 0 {
        return false;
    }

    let threshold = if name_suggests_numeric(name) {
        NUMERIC_THRESHOLD_BY_NAME
    } else {
        NUMERIC_THRESHOLD
    };
    numeric as f64 / total as f64 >= threshold
}

/// Datetime when most samples match a date pattern and parse as a date.
pub(crate) fn is_datetime_column(samples: &[String]) -> bool {
    if samples.is_empty() {
        return false;
    }

    let date_like = samples
        .iter()
        .map(|s| s.trim())
        .filter(|s| DATE_PATTERNS.iter().any(|p| p.is_match(s)) && parse_datetime(s).is_some())
        .count();

    date_like as f64 / samples.len() as f64 > DATETIME_THRESHOLD
}

/// Text when values are mostly unique and long.
fn is_text_column(values: &StringChunked) -> bool {
    let mut unique: HashSet<&str> = HashSet::new();
    let mut total_chars = 0usize;
    let mut count = 0usize;
    for value in values.into_iter().flatten() {
        unique.insert(value);
        total_chars += value.chars().count();
        count += 1;
    }
    if count == 0 {
        return false;
    }

    let unique_ratio = unique.len() as f64 / count as f64;
    let avg_length = total_chars as f64 / count as f64;
    unique_ratio > TEXT_UNIQUE_RATIO && avg_length > TEXT_AVG_LENGTH
}

/// Parse a date or timestamp in one of the accepted layouts.
///
/// Dates without a time component resolve to midnight. Values with a
/// UTC offset are converted to UTC.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}
