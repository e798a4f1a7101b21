//! Custom error types for report generation.
//!
//! This module provides the error hierarchy using `thiserror` for the whole
//! pipeline, from CSV ingestion to template rendering.
//!
//! Errors are serializable as `{ code, message }` so that HTTP front-ends can
//! return them to clients as JSON without extra mapping.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for report generation.
#[derive(Error, Debug)]
pub enum InsightError {
    /// No dataset file was supplied with the request.
    #[error("No dataset file provided")]
    MissingDataset,

    /// The supplied input is not usable tabular data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The dataset parsed but contains no columns or no data rows.
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// The input bytes are not in a supported text encoding.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Statistics or artifact computation failed.
    #[error("Failed to generate report: {0}")]
    GenerationFailed(String),

    /// Rendering a chart failed.
    #[error("Failed to render chart '{chart}': {reason}")]
    PlotFailed { chart: String, reason: String },

    /// The requested template could not be located.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// The template could not be parsed or rendered.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Internal error (e.g., blocking task failure).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InsightError>,
    },
}

impl InsightError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InsightError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a [`InsightError::PlotFailed`] from any displayable plotting error.
    pub fn plot(chart: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        InsightError::PlotFailed {
            chart: chart.into(),
            reason: reason.to_string(),
        }
    }

    /// Get a stable error code for API clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingDataset => "MISSING_DATASET",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::UnsupportedEncoding(_) => "UNSUPPORTED_ENCODING",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::GenerationFailed(_) => "GENERATION_FAILED",
            Self::PlotFailed { .. } => "PLOT_FAILED",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::Template(_) => "TEMPLATE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error was caused by the caller's input rather than by the
    /// server. Client errors map to HTTP 400, everything else to 500.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::MissingDataset
            | Self::InvalidInput(_)
            | Self::EmptyDataset(_)
            | Self::UnsupportedEncoding(_) => true,
            Self::WithContext { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for InsightError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InsightError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, InsightError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| InsightError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(InsightError::MissingDataset.error_code(), "MISSING_DATASET");
        assert_eq!(
            InsightError::TemplateNotFound("custom.html".to_string()).error_code(),
            "TEMPLATE_NOT_FOUND"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(InsightError::MissingDataset.is_client_error());
        assert!(InsightError::EmptyDataset("no rows".to_string()).is_client_error());
        assert!(InsightError::UnsupportedEncoding("binary".to_string()).is_client_error());
        assert!(!InsightError::TemplateNotFound("x".to_string()).is_client_error());
        assert!(!InsightError::GenerationFailed("boom".to_string()).is_client_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = InsightError::InvalidInput("header row missing".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("INVALID_INPUT"));
        assert!(json.contains("header row missing"));
    }

    #[test]
    fn test_with_context_preserves_code_and_class() {
        let error = InsightError::EmptyDataset("no rows".to_string()).with_context("Loading upload");
        assert!(error.to_string().contains("Loading upload"));
        assert_eq!(error.error_code(), "EMPTY_DATASET");
        assert!(error.is_client_error());
    }

    #[test]
    fn test_plot_helper() {
        let error = InsightError::plot("heatmap", "backend failure");
        assert_eq!(error.error_code(), "PLOT_FAILED");
        assert!(error.to_string().contains("heatmap"));
    }
}
