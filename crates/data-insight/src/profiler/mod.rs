//! Data profiling module for dataset analysis.
//!
//! This module provides functionality for profiling datasets, including:
//! - Type inference for columns
//! - Per-column descriptive statistics
//! - Dataset-level facts (missing cells, duplicate rows)

mod statistics;
mod type_inference;

use crate::config::ReportConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{ColumnKind, ColumnSummary, DatasetMetadata};
use tracing::debug;

pub(crate) use statistics::{calculate_mean, quantile, top_frequencies};
pub(crate) use type_inference::infer_column_kind;
pub use type_inference::parse_datetime;

/// Profiling output: one summary per column plus dataset metadata.
#[derive(Debug, Clone)]
pub struct DatasetProfile {
    pub columns: Vec<ColumnSummary>,
    pub metadata: DatasetMetadata,
}

/// Data profiler for computing column summaries over the full dataset.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile an entire dataset.
    ///
    /// Statistics are computed on every row, so the sample sizes in the
    /// metadata start out equal to the row count.
    pub fn profile_dataset(dataset: &Dataset, config: &ReportConfig) -> Result<DatasetProfile> {
        let mut columns = Vec::with_capacity(dataset.width());
        for (name, kind) in dataset.columns() {
            columns.push(Self::profile_column(dataset, &name, kind, config)?);
        }

        let metadata = Self::build_metadata(dataset)?;
        Ok(DatasetProfile { columns, metadata })
    }

    /// Summarize a single column.
    pub fn profile_column(
        dataset: &Dataset,
        name: &str,
        kind: ColumnKind,
        config: &ReportConfig,
    ) -> Result<ColumnSummary> {
        let total_rows = dataset.height();
        let missing = dataset.missing_count(name)?;
        let missing_pct = if total_rows > 0 {
            missing as f64 / total_rows as f64 * 100.0
        } else {
            0.0
        };

        let mut summary = ColumnSummary {
            name: name.to_string(),
            kind,
            dtype: dataset.dtype_name(name)?,
            count: total_rows - missing,
            missing,
            missing_pct,
            unique: 0,
            numeric: None,
            text: None,
            datetime: None,
            top_values: Vec::new(),
        };

        if kind.is_numeric() {
            let values: Vec<f64> = dataset.numeric_values(name)?.into_iter().flatten().collect();
            let as_bits: Vec<String> = values.iter().map(|v| v.to_bits().to_string()).collect();
            summary.unique = statistics::count_unique(&as_bits);
            summary.numeric = statistics::numeric_stats(&values);
        } else {
            let values: Vec<String> = dataset.string_values(name)?.into_iter().flatten().collect();
            summary.unique = statistics::count_unique(&values);
            summary.top_values = statistics::top_frequencies(&values, total_rows, config.top_values);
            match kind {
                ColumnKind::Text => summary.text = statistics::text_stats(&values),
                ColumnKind::Datetime => summary.datetime = statistics::datetime_stats(&values),
                _ => {}
            }
        }

        debug!(
            "Profiled '{}' ({}): {} values, {} missing, {} unique",
            name, kind, summary.count, summary.missing, summary.unique
        );
        Ok(summary)
    }

    fn build_metadata(dataset: &Dataset) -> Result<DatasetMetadata> {
        let total_rows = dataset.height();
        let total_columns = dataset.width();
        let count_kind = |kind| dataset.columns_of_kind(kind).len();

        let missing_cells = dataset.missing_cells();
        let total_cells = total_rows * total_columns;
        let duplicate_rows = dataset.duplicate_rows()?;

        Ok(DatasetMetadata {
            total_rows,
            total_columns,
            numeric_columns: count_kind(ColumnKind::Numeric),
            categorical_columns: count_kind(ColumnKind::Categorical),
            datetime_columns: count_kind(ColumnKind::Datetime),
            text_columns: count_kind(ColumnKind::Text),
            missing_cells,
            missing_cells_pct: percentage(missing_cells, total_cells),
            duplicate_rows,
            duplicate_pct: percentage(duplicate_rows, total_rows),
            skipped_rows: dataset.skipped_rows().len(),
            // no sampling yet; ReportGenerator records what the charts used
            plot_sample_rows: total_rows,
            relationship_sample_rows: total_rows,
        })
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
