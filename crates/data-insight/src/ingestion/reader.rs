//! CSV record parsing with per-row tolerance.

use crate::error::{InsightError, Result};
use crate::types::SkippedRow;
use crate::utils::is_missing_marker;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Column-major table of raw cell values, as read from the CSV text.
///
/// Missing cells (empty strings and NA markers) are already `None`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawTable {
    pub headers: Vec<String>,
    pub columns: Vec<Vec<Option<String>>>,
    pub skipped: Vec<SkippedRow>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

/// CSV parser that skips malformed rows instead of failing the whole file.
pub(crate) struct CsvTableReader {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvTableReader {
    /// Set custom delimiter
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse CSV text into a [`RawTable`].
    ///
    /// Rows with fewer fields than the header are padded with missing
    /// cells. Rows with more fields, or that cannot be parsed, are skipped
    /// and recorded with their line number. Blank lines are ignored.
    pub fn read(&self, content: &str) -> Result<RawTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(content.as_bytes());

        let header_record = reader
            .headers()
            .map_err(|e| InsightError::InvalidInput(format!("Failed to read CSV header: {}", e)))?
            .clone();

        if header_record.is_empty() {
            return Err(InsightError::EmptyDataset(
                "no header row found".to_string(),
            ));
        }

        let headers = normalize_headers(&header_record);
        let width = headers.len();
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
        let mut skipped = Vec::new();

        for result in reader.records() {
            match result {
                Ok(record) => {
                    let line = record.position().map_or(0, |p| p.line());
                    if record.len() > width {
                        skipped.push(SkippedRow {
                            line,
                            reason: format!("expected {} fields, found {}", width, record.len()),
                        });
                        continue;
                    }
                    // short rows keep their leading fields; the rest are missing
                    let mut fields = record.iter();
                    for column in columns.iter_mut() {
                        column.push(fields.next().and_then(normalize_cell));
                    }
                }
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line());
                    skipped.push(SkippedRow {
                        line,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !skipped.is_empty() {
            warn!(
                "Skipped {} malformed row(s); first at line {}",
                skipped.len(),
                skipped[0].line
            );
        }

        let table = RawTable {
            headers,
            columns,
            skipped,
        };

        if table.row_count() == 0 {
            return Err(InsightError::EmptyDataset(if table.skipped.is_empty() {
                "the file has a header but no data rows".to_string()
            } else {
                format!(
                    "all {} data rows were malformed",
                    table.skipped.len()
                )
            }));
        }

        debug!(
            "Parsed CSV: {} rows x {} columns",
            table.row_count(),
            table.headers.len()
        );
        Ok(table)
    }
}

fn normalize_cell(field: &str) -> Option<String> {
    if is_missing_marker(field) {
        None
    } else {
        Some(field.to_string())
    }
}

/// Trim header names, name blank headers `Unnamed: {i}` and de-duplicate
/// repeated names with a `.N` suffix.
fn normalize_headers(record: &StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(record.len());

    for (idx, raw) in record.iter().enumerate() {
        let trimmed = raw.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        headers.push(name);
    }

    headers
}
