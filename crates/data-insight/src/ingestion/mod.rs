//! Dataset ingestion: byte decoding, CSV parsing and column typing.
//!
//! The loader is tolerant at row level (malformed rows are skipped and
//! recorded) but strict at file level: undecodable input, a missing header
//! or a table without data rows is rejected as a client error.

mod decoding;
mod reader;

use crate::dataset::Dataset;
use crate::error::{InsightError, Result, ResultExt};
use crate::profiler::infer_column_kind;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

use decoding::decode_bytes;
use reader::CsvTableReader;

/// Seed used to pick the values inspected during type inference.
pub const INFERENCE_SEED: u64 = 42;

/// Load a dataset from the raw bytes of an uploaded CSV file.
pub fn load_csv_bytes(bytes: &[u8]) -> Result<Dataset> {
    let text = decode_bytes(bytes)?;
    let table = CsvTableReader::default().read(&text)?;

    let columns: Vec<Column> = table
        .headers
        .iter()
        .zip(table.columns)
        .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
        .collect();
    let frame = DataFrame::new(columns).context("Building data frame")?;

    let mut kinds = Vec::with_capacity(frame.width());
    for column in frame.get_columns() {
        let kind = infer_column_kind(column.as_materialized_series(), INFERENCE_SEED)?;
        debug!("Column '{}' inferred as {}", column.name(), kind);
        kinds.push(kind);
    }

    let dataset = Dataset::from_string_frame(frame, kinds, table.skipped)?;
    info!(
        "Loaded dataset: {} rows x {} columns ({} rows skipped)",
        dataset.height(),
        dataset.width(),
        dataset.skipped_rows().len()
    );
    Ok(dataset)
}

/// Load a dataset from a CSV file on disk.
pub fn load_csv_path(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(InsightError::from)
        .context(format!("Reading '{}'", path.display()))?;
    load_csv_bytes(&bytes)
}
