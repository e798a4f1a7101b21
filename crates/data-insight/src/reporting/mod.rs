//! Report generation module.
//!
//! [`ReportGenerator`] runs the analysis over a [`Dataset`](crate::Dataset)
//! and renders the result through a [`TemplateSource`].
//!
//! # Example
//!
//! ```rust,ignore
//! use data_insight::reporting::{ReportGenerator, TemplateSource};
//!
//! let generator = ReportGenerator::default();
//! let html = generator.generate_report(&csv_bytes, &TemplateSource::Bundled)?;
//! ReportGenerator::save_report(&html, "data_insight_report.html")?;
//! ```
//!
//! # Templates
//!
//! Templates use Jinja2 syntax with HTML auto-escaping. The context exposes
//! `title`, `generated_at`, `shape`, `metadata`, `dataset_head`,
//! `column_stats`, `numeric_cols`, `categorical_cols`, `correlations`,
//! `distributions`, `relationships`, `skipped_rows` and `image_mime`.
//! Images are base64 strings meant for `data:{{ image_mime }};base64,...` URIs.

mod generator;
mod template;

pub use generator::{CorrelationSection, RelationshipSection, ReportArtifacts, ReportGenerator};
pub use template::{BUNDLED_TEMPLATE, TemplateSource, render_template};
pub(crate) use template::render_str;
