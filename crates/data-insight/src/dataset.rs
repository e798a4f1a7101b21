//! In-memory dataset loaded from an upload.

use crate::error::{InsightError, Result, ResultExt};
use crate::types::{ColumnKind, SkippedRow};
use crate::reporting::render_str;
use crate::utils::parse_numeric_string;
use minijinja::context;
use polars::prelude::*;

/// A loaded table with the inferred kind of each column.
///
/// Numeric columns are stored as `Float64`; every other column keeps its
/// raw string values. Missing cells are nulls.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    kinds: Vec<ColumnKind>,
    skipped_rows: Vec<SkippedRow>,
}

impl Dataset {
    /// Build a dataset from a string-typed frame and the per-column kinds.
    ///
    /// Columns classified as numeric are converted to `Float64`; cells that
    /// do not parse as finite numbers become missing.
    pub(crate) fn from_string_frame(
        mut frame: DataFrame,
        kinds: Vec<ColumnKind>,
        skipped_rows: Vec<SkippedRow>,
    ) -> Result<Self> {
        if kinds.len() != frame.width() {
            return Err(InsightError::Internal(format!(
                "{} column kinds for {} columns",
                kinds.len(),
                frame.width()
            )));
        }

        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        for (name, kind) in names.iter().zip(&kinds) {
            if !kind.is_numeric() {
                continue;
            }
            let series = frame
                .column(name)
                .context(format!("Column '{}' not found", name))?
                .as_materialized_series()
                .clone();
            let converted = string_to_float(&series)?;
            frame
                .replace(name, converted)
                .context(format!("Converting '{}' to numeric", name))?;
        }

        Ok(Self {
            frame,
            kinds,
            skipped_rows,
        })
    }

    /// Underlying polars frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    /// Column names paired with their inferred kinds, in file order.
    pub fn columns(&self) -> Vec<(String, ColumnKind)> {
        self.column_names().into_iter().zip(self.kinds.iter().copied()).collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        let idx = self.frame.get_column_index(name)?;
        self.kinds.get(idx).copied()
    }

    /// Names of all columns of one kind, in file order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name)
            .collect()
    }

    /// Rows dropped while loading because they were malformed.
    pub fn skipped_rows(&self) -> &[SkippedRow] {
        &self.skipped_rows
    }

    fn series(&self, name: &str) -> Result<&Series> {
        Ok(self
            .frame
            .column(name)
            .context(format!("Column '{}' not found", name))?
            .as_materialized_series())
    }

    /// Values of a numeric column, one per row.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self.series(name)?;
        let values = series
            .f64()
            .context(format!("Column '{}' is not numeric", name))?;
        Ok(values.into_iter().collect())
    }

    /// Values of a string column, one per row.
    pub fn string_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self.series(name)?;
        let values = series
            .str()
            .context(format!("Column '{}' is not a string column", name))?;
        Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
    }

    /// Number of missing cells in a column.
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.series(name)?.null_count())
    }

    /// Number of missing cells across the whole table.
    pub fn missing_cells(&self) -> usize {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.null_count())
            .sum()
    }

    /// Number of rows that repeat an earlier row exactly.
    pub fn duplicate_rows(&self) -> Result<usize> {
        let unique = self
            .frame
            .unique::<&str, &str>(None, UniqueKeepStrategy::First, None)
            .context("Counting duplicate rows")?;
        Ok(self.height() - unique.height())
    }

    /// Storage type name of a column after loading.
    pub fn dtype_name(&self, name: &str) -> Result<String> {
        let dtype = self.series(name)?.dtype().clone();
        Ok(match dtype {
            DataType::Float64 => "float64".to_string(),
            DataType::String => "string".to_string(),
            other => format!("{:?}", other).to_lowercase(),
        })
    }

    /// Render the first `rows` rows as an HTML table.
    ///
    /// Cell contents are escaped; missing cells show as `NaN`.
    pub fn head_html(&self, rows: usize) -> Result<String> {
        let head = self.frame.head(Some(rows));
        let names = self.column_names();

        let mut cells: Vec<Vec<String>> = Vec::with_capacity(names.len());
        for name in &names {
            let series = head
                .column(name)
                .context(format!("Column '{}' not found", name))?
                .as_materialized_series();
            let rendered: Vec<String> = match series.dtype() {
                DataType::Float64 => series
                    .f64()?
                    .into_iter()
                    .map(|v| v.map_or_else(|| "NaN".to_string(), format_number))
                    .collect(),
                _ => series
                    .str()?
                    .into_iter()
                    .map(|v| v.map_or_else(|| "NaN".to_string(), str::to_string))
                    .collect(),
            };
            cells.push(rendered);
        }

        let table_rows: Vec<Vec<&str>> = (0..head.height())
            .map(|row| cells.iter().map(|column| column[row].as_str()).collect())
            .collect();
        render_str(
            HEAD_TABLE_TEMPLATE,
            context! { columns => names, rows => table_rows },
        )
    }
}

const HEAD_TABLE_TEMPLATE: &str = include_str!("../templates/dataset_head.html");

/// Convert a string series to Float64, turning unparseable cells into nulls.
fn string_to_float(series: &Series) -> Result<Series> {
    let str_series = series.str()?;
    let values: Vec<Option<f64>> = str_series
        .into_iter()
        .map(|v| v.and_then(parse_numeric_string))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Format a float the way a table preview shows it.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        let rounded = format!("{:.4}", value);
        rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
