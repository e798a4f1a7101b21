//! Configuration types for report generation.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic generator setup.

use serde::{Deserialize, Serialize};

/// Default title rendered at the top of every report.
pub const DEFAULT_TITLE: &str = "Dataset Analysis Report";

/// Default upper bound on rows fed into distribution plots.
pub const DEFAULT_PLOT_SAMPLE_CAP: usize = 5_000;

/// Default upper bound on rows fed into relationship plots.
pub const DEFAULT_RELATIONSHIP_SAMPLE_CAP: usize = 500;

/// Configuration for the report generator.
///
/// Use [`ReportConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use data_insight::config::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .title("Quarterly sales")
///     .plot_sample_cap(2_000)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title rendered in the report header.
    /// Default: "Dataset Analysis Report"
    pub title: String,

    /// Maximum number of rows used to draw distribution plots.
    /// Statistics are always computed on every row.
    /// Default: 5000
    pub plot_sample_cap: usize,

    /// Maximum number of rows used to draw relationship plots
    /// (pair plot, scatter plot, grouped box plot).
    /// Default: 500
    pub relationship_sample_cap: usize,

    /// Number of most frequent values listed per non-numeric column.
    /// Default: 5
    pub top_values: usize,

    /// Number of categories drawn in bar charts.
    /// Default: 10
    pub bar_chart_categories: usize,

    /// Maximum number of numeric columns in the pair plot grid.
    /// Default: 5
    pub pairplot_max_columns: usize,

    /// Number of leading rows shown in the dataset preview table.
    /// Default: 10
    pub head_rows: usize,

    /// Seed for the deterministic plot sampler.
    /// Default: 42
    pub sample_seed: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            plot_sample_cap: DEFAULT_PLOT_SAMPLE_CAP,
            relationship_sample_cap: DEFAULT_RELATIONSHIP_SAMPLE_CAP,
            top_values: 5,
            bar_chart_categories: 10,
            pairplot_max_columns: 5,
            head_rows: 10,
            sample_seed: 42,
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let positive = [
            ("plot_sample_cap", self.plot_sample_cap),
            ("relationship_sample_cap", self.relationship_sample_cap),
            ("top_values", self.top_values),
            ("bar_chart_categories", self.bar_chart_categories),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigValidationError::MustBePositive(field.to_string()));
            }
        }

        if self.pairplot_max_columns < 2 {
            return Err(ConfigValidationError::InvalidPairplotColumns(
                self.pairplot_max_columns,
            ));
        }

        if self.title.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTitle);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{0}': must be at least 1")]
    MustBePositive(String),

    #[error("Invalid pair plot column count: {0} (must be at least 2)")]
    InvalidPairplotColumns(usize),

    #[error("Report title must not be empty")]
    EmptyTitle,
}

impl From<ConfigValidationError> for crate::error::InsightError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::InsightError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ReportConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    title: Option<String>,
    plot_sample_cap: Option<usize>,
    relationship_sample_cap: Option<usize>,
    top_values: Option<usize>,
    bar_chart_categories: Option<usize>,
    pairplot_max_columns: Option<usize>,
    head_rows: Option<usize>,
    sample_seed: Option<u64>,
}

impl ReportConfigBuilder {
    /// Set the report title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the row cap for distribution plots.
    ///
    /// Datasets with more rows are downsampled before plotting.
    pub fn plot_sample_cap(mut self, cap: usize) -> Self {
        self.plot_sample_cap = Some(cap);
        self
    }

    /// Set the row cap for relationship plots.
    pub fn relationship_sample_cap(mut self, cap: usize) -> Self {
        self.relationship_sample_cap = Some(cap);
        self
    }

    /// Set how many top values are listed for non-numeric columns.
    pub fn top_values(mut self, n: usize) -> Self {
        self.top_values = Some(n);
        self
    }

    /// Set how many categories bar charts show.
    pub fn bar_chart_categories(mut self, n: usize) -> Self {
        self.bar_chart_categories = Some(n);
        self
    }

    /// Set the maximum number of numeric columns in the pair plot.
    pub fn pairplot_max_columns(mut self, n: usize) -> Self {
        self.pairplot_max_columns = Some(n);
        self
    }

    /// Set how many rows the preview table shows.
    pub fn head_rows(mut self, n: usize) -> Self {
        self.head_rows = Some(n);
        self
    }

    /// Set the sampler seed.
    pub fn sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ReportConfig` or an error if validation fails.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let defaults = ReportConfig::default();
        let config = ReportConfig {
            title: self.title.unwrap_or(defaults.title),
            plot_sample_cap: self.plot_sample_cap.unwrap_or(defaults.plot_sample_cap),
            relationship_sample_cap: self
                .relationship_sample_cap
                .unwrap_or(defaults.relationship_sample_cap),
            top_values: self.top_values.unwrap_or(defaults.top_values),
            bar_chart_categories: self
                .bar_chart_categories
                .unwrap_or(defaults.bar_chart_categories),
            pairplot_max_columns: self
                .pairplot_max_columns
                .unwrap_or(defaults.pairplot_max_columns),
            head_rows: self.head_rows.unwrap_or(defaults.head_rows),
            sample_seed: self.sample_seed.unwrap_or(defaults.sample_seed),
        };

        config.validate()?;
        Ok(config)
    }
}
