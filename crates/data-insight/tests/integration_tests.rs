//! Integration tests for end-to-end report generation.
//!
//! These tests drive the public API from raw CSV bytes to rendered HTML using
//! the datasets in `tests/fixtures`.

use data_insight::{
    ColumnKind, InsightError, ReportConfig, ReportGenerator, TemplateSource, load_csv_bytes,
    load_csv_path,
};
use pretty_assertions::assert_eq;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(filename: &str) -> Vec<u8> {
    fs::read(fixtures_path().join(filename)).expect("fixture should exist")
}

fn generate(csv: &[u8]) -> String {
    ReportGenerator::default()
        .generate_report(csv, &TemplateSource::Bundled)
        .expect("report should render")
}

/// CSV with `rows` rows of two correlated numeric columns and a label column.
fn synthetic_csv(rows: usize) -> String {
    let mut csv = String::from("x,y,group\n");
    for i in 0..rows {
        let x = (i % 1000) as f64 / 10.0;
        let y = 2.0 * x + (i % 7) as f64;
        let group = ["alpha", "beta", "gamma"][i % 3];
        writeln!(csv, "{},{},{}", x, y, group).unwrap();
    }
    csv
}

// ============================================================================
// Full Report Tests
// ============================================================================

#[test]
fn test_customers_report_contains_all_sections() {
    let html = generate(&read_fixture("customers.csv"));

    assert!(html.contains("Dataset Analysis Report"));
    assert!(html.contains("id=\"correlations\""));
    assert!(html.contains("id=\"distributions\""));
    assert!(html.contains("id=\"relationships\""));
    assert!(html.contains("data:image/svg+xml;base64,"));
    assert!(html.contains("<table class=\"dataframe data-table\">"));
}

#[test]
fn test_customers_column_kinds_and_totals() {
    let dataset = load_csv_path(fixtures_path().join("customers.csv")).unwrap();
    assert_eq!(dataset.height(), 12);
    assert_eq!(dataset.kind_of("age"), Some(ColumnKind::Numeric));
    assert_eq!(dataset.kind_of("annual_income"), Some(ColumnKind::Numeric));
    assert_eq!(dataset.kind_of("segment"), Some(ColumnKind::Categorical));
    assert_eq!(dataset.kind_of("signup_date"), Some(ColumnKind::Datetime));
    assert_eq!(dataset.kind_of("notes"), Some(ColumnKind::Text));

    let artifacts = ReportGenerator::default().build_artifacts(&dataset).unwrap();
    assert_eq!(artifacts.metadata.total_rows, 12);
    assert_eq!(artifacts.shape, (12, 7));

    let age = artifacts
        .column_stats
        .iter()
        .find(|c| c.name == "age")
        .unwrap();
    assert_eq!(age.count, 11);
    assert_eq!(age.missing, 1);

    // "NA" and "N/A" in the notes column count as missing cells
    let notes = artifacts
        .column_stats
        .iter()
        .find(|c| c.name == "notes")
        .unwrap();
    assert_eq!(notes.missing, 6);
}

#[test]
fn test_categories_only_has_no_numeric_correlation() {
    let dataset = load_csv_bytes(&read_fixture("categories_only.csv")).unwrap();
    let artifacts = ReportGenerator::default().build_artifacts(&dataset).unwrap();

    assert!(artifacts.numeric_cols.is_empty());
    assert!(artifacts.correlations.numeric_matrix.is_none());
    assert!(artifacts.correlations.categorical_matrix.is_some());
    assert!(artifacts.relationships.pairplot.is_none());
    assert!(artifacts.relationships.scatterplot.is_none());

    let html = ReportGenerator::default()
        .render(&artifacts, &TemplateSource::Bundled)
        .unwrap();
    assert!(!html.contains("Numeric correlation (Pearson)"));
    assert!(!html.contains("id=\"relationships\""));
}

#[test]
fn test_long_rows_are_skipped_and_listed() {
    let html = generate(&read_fixture("malformed.csv"));
    assert!(html.contains("Skipped rows (2)"));

    let dataset = load_csv_bytes(&read_fixture("malformed.csv")).unwrap();
    let lines: Vec<u64> = dataset.skipped_rows().iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![4, 7]);
}

#[test]
fn test_short_rows_are_kept_with_missing_cells() {
    let dataset = load_csv_bytes(&read_fixture("malformed.csv")).unwrap();
    assert_eq!(dataset.height(), 5);

    let artifacts = ReportGenerator::default().build_artifacts(&dataset).unwrap();
    assert_eq!(artifacts.metadata.total_rows, 5);

    let category = artifacts
        .column_stats
        .iter()
        .find(|c| c.name == "category")
        .unwrap();
    assert_eq!(category.count, 4);
    assert_eq!(category.missing, 1);
}

#[test]
fn test_large_dataset_is_downsampled_for_plots_only() {
    let csv = synthetic_csv(100_000);
    let dataset = load_csv_bytes(csv.as_bytes()).unwrap();
    let artifacts = ReportGenerator::default().build_artifacts(&dataset).unwrap();

    assert_eq!(artifacts.metadata.total_rows, 100_000);
    assert_eq!(artifacts.metadata.plot_sample_rows, 5_000);
    assert_eq!(artifacts.metadata.relationship_sample_rows, 500);

    let x = artifacts
        .column_stats
        .iter()
        .find(|c| c.name == "x")
        .unwrap();
    assert_eq!(x.count, 100_000);

    let matrix = artifacts.correlations.numeric_matrix.unwrap();
    assert!(matrix.get("x", "y").unwrap() > 0.99);
}

#[test]
fn test_reports_are_deterministic_apart_from_timestamp() {
    let csv = synthetic_csv(6_000);
    let dataset = load_csv_bytes(csv.as_bytes()).unwrap();
    let generator = ReportGenerator::default();

    let first = generator.build_artifacts(&dataset).unwrap();
    let second = generator.build_artifacts(&dataset).unwrap();
    assert_eq!(first.distributions, second.distributions);
    assert_eq!(first.relationships.pairplot, second.relationships.pairplot);
}

// ============================================================================
// Template Tests
// ============================================================================

#[test]
fn test_custom_template_file() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("summary.html");
    fs::write(
        &template_path,
        "<h1>{{ title }}</h1><p>{{ shape[0] }}x{{ shape[1] }}</p>\
         {% for col in column_stats %}<i>{{ col.name }}:{{ col.type }}</i>{% endfor %}",
    )
    .unwrap();

    let generator =
        ReportGenerator::new(ReportConfig::builder().title("Shop <Q3>").build().unwrap()).unwrap();
    let html = generator
        .generate_report(
            &read_fixture("categories_only.csv"),
            &TemplateSource::File(template_path),
        )
        .unwrap();

    assert_eq!(
        html,
        "<h1>Shop &lt;Q3&gt;</h1><p>6x3</p>\
         <i>color:Categorical</i><i>shape:Categorical</i><i>size:Categorical</i>"
    );
}

#[test]
fn test_missing_template_file() {
    let result = ReportGenerator::default().generate_report(
        &read_fixture("categories_only.csv"),
        &TemplateSource::File(PathBuf::from("/nonexistent/template.html")),
    );
    let err = result.unwrap_err();
    assert_eq!(err.error_code(), "TEMPLATE_NOT_FOUND");
    assert!(!err.is_client_error());
}

// ============================================================================
// Input Error Tests
// ============================================================================

#[test]
fn test_utf16_input_is_decoded() {
    let text = String::from_utf8(read_fixture("categories_only.csv")).unwrap();
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let dataset = load_csv_bytes(&bytes).unwrap();
    assert_eq!(dataset.height(), 6);
    assert_eq!(dataset.column_names(), vec!["color", "shape", "size"]);
}

#[test]
fn test_invalid_inputs_are_client_errors() {
    let cases: [&[u8]; 4] = [
        b"",
        b"only,a,header\n",
        b"\x00\x01\x02binary",
        b"name\n\xFF\xFEnot utf8 after start\n",
    ];

    for bytes in cases {
        let err = ReportGenerator::default()
            .generate_report(bytes, &TemplateSource::Bundled)
            .unwrap_err();
        assert!(err.is_client_error(), "expected client error, got {err:?}");
    }

    assert!(matches!(
        load_csv_bytes(b"").unwrap_err(),
        InsightError::EmptyDataset(_)
    ));
}
