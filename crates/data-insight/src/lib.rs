//! Data Insight Library
//!
//! Exploratory data analysis reports for CSV datasets, built with Rust and Polars.
//!
//! # Overview
//!
//! Given the bytes of a CSV file, the library produces a self-contained HTML
//! report:
//!
//! - **Ingestion**: Encoding checks, tolerant CSV parsing (malformed rows are skipped and listed)
//! - **Profiling**: Column type inference and descriptive statistics over every row
//! - **Analysis**: Pearson correlation for numeric columns, Cramér's V for categorical ones
//! - **Charts**: Distribution, heatmap and relationship plots rendered to SVG
//! - **Rendering**: Jinja2-style templates with a bundled default
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_insight::{ReportConfig, ReportGenerator, TemplateSource};
//!
//! let config = ReportConfig::builder()
//!     .title("Quarterly sales")
//!     .build()?;
//!
//! let html = ReportGenerator::new(config)?
//!     .generate_report(&std::fs::read("sales.csv")?, &TemplateSource::Bundled)?;
//! ```
//!
//! # Downsampling
//!
//! Statistics always use the full dataset. Charts are drawn from a seeded
//! uniform sample of at most [`ReportConfig::plot_sample_cap`] rows
//! (distribution plots) or [`ReportConfig::relationship_sample_cap`] rows
//! (relationship plots), so the same input always yields the same report.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ingestion;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, ReportConfig, ReportConfigBuilder};
pub use dataset::Dataset;
pub use error::{InsightError, Result as InsightResult, ResultExt};
pub use ingestion::{load_csv_bytes, load_csv_path};
pub use profiler::{DataProfiler, DatasetProfile};
pub use reporting::{ReportArtifacts, ReportGenerator, TemplateSource};
pub use types::{
    ColumnKind, ColumnSummary, CorrelationMatrix, DatasetMetadata, FrequencyEntry, SkippedRow,
};

/// File name used when a report is returned or saved without an explicit name.
pub const DEFAULT_REPORT_FILENAME: &str = "data_insight_report.html";
