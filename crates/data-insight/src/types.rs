use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type inferred for a column.
///
/// Serialized with capitalized names (`"Numeric"`, `"Categorical"`, ...) so
/// templates can compare against them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Integer or floating point values.
    Numeric,
    /// Repeated labels with limited cardinality.
    Categorical,
    /// Calendar dates or timestamps.
    Datetime,
    /// Free-form, mostly unique text.
    Text,
}

impl ColumnKind {
    /// Returns a human-readable name for the kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Categorical => "Categorical",
            Self::Datetime => "Datetime",
            Self::Text => "Text",
        }
    }

    /// Whether the column takes part in numeric analysis (correlation,
    /// histograms, relationship plots).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
    /// Share of all rows (missing included), in percent.
    pub pct: f64,
}

/// Descriptive statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub skewness: f64,
    /// Values outside `[q1 - 1.5 * IQR, q3 + 1.5 * IQR]`.
    pub outlier_count: usize,
}

/// Value length statistics of a text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub avg_length: f64,
    pub min_length: usize,
    pub max_length: usize,
}

/// Range of a datetime column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatetimeStats {
    pub earliest: String,
    pub latest: String,
    pub span_days: i64,
}

/// Per-column summary rendered in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    /// Storage type of the column after loading (`float64` or `string`).
    pub dtype: String,
    /// Number of non-missing values.
    pub count: usize,
    pub missing: usize,
    pub missing_pct: f64,
    pub unique: usize,
    #[serde(flatten)]
    pub numeric: Option<NumericStats>,
    #[serde(flatten)]
    pub text: Option<TextStats>,
    #[serde(flatten)]
    pub datetime: Option<DatetimeStats>,
    /// Most frequent values; empty for numeric columns.
    pub top_values: Vec<FrequencyEntry>,
}

/// Pairwise association matrix between columns.
///
/// Cells are `None` where the coefficient is undefined (constant column,
/// fewer than two paired observations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Look up the coefficient between two columns by name.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An input row that was dropped while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the uploaded file.
    pub line: u64,
    pub reason: String,
}

/// Dataset-level facts shown at the top of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Number of data rows loaded (header excluded).
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub datetime_columns: usize,
    pub text_columns: usize,
    pub missing_cells: usize,
    pub missing_cells_pct: f64,
    pub duplicate_rows: usize,
    pub duplicate_pct: f64,
    pub skipped_rows: usize,
    /// Rows used to draw distribution plots after downsampling.
    pub plot_sample_rows: usize,
    /// Rows used to draw relationship plots after downsampling.
    pub relationship_sample_rows: usize,
}
