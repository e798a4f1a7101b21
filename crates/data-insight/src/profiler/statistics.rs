//! Statistical analysis functions for column profiling.
//!
//! All functions work on plain value slices extracted from the dataset, so
//! that statistics always cover every row regardless of plot sampling.

use super::type_inference::parse_datetime;
use crate::types::{DatetimeStats, FrequencyEntry, NumericStats, TextStats};
use std::collections::HashMap;

/// Descriptive statistics of a numeric column.
///
/// Returns `None` when the column has no values.
pub(crate) fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = calculate_mean(values);
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);

    Some(NumericStats {
        mean,
        std: calculate_std(values),
        min: sorted[0],
        q1,
        median: quantile(&sorted, 0.5),
        q3,
        max: sorted[sorted.len() - 1],
        skewness: calculate_skewness(values),
        outlier_count: count_outliers(values, q1, q3),
    })
}

pub(crate) fn calculate_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn calculate_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean = calculate_mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Adjusted Fisher-Pearson skewness.
///
/// Zero for fewer than three values or a constant column.
pub(crate) fn calculate_skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }

    let mean = calculate_mean(values);
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    if m2 <= f64::EPSILON * mean.abs().max(1.0) {
        return 0.0;
    }
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n as f64;

    let n = n as f64;
    let g1 = m3 / m2.powf(1.5);
    g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
}

/// Quantile of sorted values with linear interpolation between closest ranks.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Count values outside the 1.5 * IQR fences.
pub(crate) fn count_outliers(values: &[f64], q1: f64, q3: f64) -> usize {
    let iqr = q3 - q1;
    let lower_bound = q1 - 1.5 * iqr;
    let upper_bound = q3 + 1.5 * iqr;
    values
        .iter()
        .filter(|&&v| v < lower_bound || v > upper_bound)
        .count()
}

/// Length statistics (in characters) of text values.
pub(crate) fn text_stats<S: AsRef<str>>(values: &[S]) -> Option<TextStats> {
    if values.is_empty() {
        return None;
    }

    let lengths: Vec<usize> = values.iter().map(|v| v.as_ref().chars().count()).collect();
    Some(TextStats {
        avg_length: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        min_length: lengths.iter().copied().min().unwrap_or(0),
        max_length: lengths.iter().copied().max().unwrap_or(0),
    })
}

/// Earliest and latest timestamps of a datetime column.
///
/// Values that do not parse are ignored.
pub(crate) fn datetime_stats<S: AsRef<str>>(values: &[S]) -> Option<DatetimeStats> {
    let parsed: Vec<_> = values
        .iter()
        .filter_map(|v| parse_datetime(v.as_ref()))
        .collect();
    let earliest = parsed.iter().min()?;
    let latest = parsed.iter().max()?;

    Some(DatetimeStats {
        earliest: earliest.format("%Y-%m-%d %H:%M:%S").to_string(),
        latest: latest.format("%Y-%m-%d %H:%M:%S").to_string(),
        span_days: (*latest - *earliest).num_days(),
    })
}

/// Count of distinct values.
pub(crate) fn count_unique<S: AsRef<str>>(values: &[S]) -> usize {
    values
        .iter()
        .map(|v| v.as_ref())
        .collect::<std::collections::HashSet<_>>()
        .len()
}

/// Most frequent values, by descending count.
///
/// Ties keep the order in which values first appear. Percentages are
/// relative to `total_rows` so missing cells are part of the denominator.
pub(crate) fn top_frequencies<S: AsRef<str>>(
    values: &[S],
    total_rows: usize,
    limit: usize,
) -> Vec<FrequencyEntry> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.iter().enumerate() {
        counts
            .entry(value.as_ref())
            .or_insert((0, position))
            .0 += 1;
    }

    let mut entries: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first))| (value, count, first))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    entries
        .into_iter()
        .take(limit)
        .map(|(value, count, _)| FrequencyEntry {
            value: value.to_string(),
            count,
            pct: if total_rows > 0 {
                count as f64 / total_rows as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
