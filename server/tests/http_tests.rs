//! HTTP-level tests for the report endpoints.

use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::{App, test, web};
use data_insight_server::{AppState, ServerConfig, configure};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

const BOUNDARY: &str = "----data-insight-test-boundary";

struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    content: &'a [u8],
}

impl<'a> Part<'a> {
    fn file(name: &'a str, filename: &'a str, content: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            content,
        }
    }

    fn text(name: &'a str, content: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content: content.as_bytes(),
        }
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn report_request(parts: &[Part<'_>]) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/generate-report")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(parts))
}

fn sales_csv() -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sales.csv");
    fs::read(path).unwrap()
}

struct TestEnv {
    scratch_root: TempDir,
    templates_dir: TempDir,
    state: web::Data<AppState>,
}

impl TestEnv {
    fn new() -> Self {
        Self::with_upload_limit(1024 * 1024)
    }

    fn with_upload_limit(limit: usize) -> Self {
        let scratch_root = tempfile::tempdir().unwrap();
        let templates_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::builder()
            .scratch_root(scratch_root.path())
            .templates_dir(templates_dir.path())
            .max_upload_bytes(limit)
            .build()
            .unwrap();
        let state = web::Data::new(AppState::new(config).unwrap());
        Self {
            scratch_root,
            templates_dir,
            state,
        }
    }

    fn scratch_entries(&self) -> usize {
        count_entries(self.scratch_root.path())
    }
}

fn count_entries(path: &Path) -> usize {
    fs::read_dir(path).unwrap().count()
}

async fn json_body(response: actix_web::dev::ServiceResponse) -> serde_json::Value {
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[actix_web::test]
async fn test_health() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;

    let response = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

// ============================================================================
// Report generation
// ============================================================================

#[actix_web::test]
async fn test_generate_report_returns_html_attachment() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;
    let csv = sales_csv();

    let response = test::call_service(
        &app,
        report_request(&[Part::file("dataset", "sales.csv", &csv)]).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("data_insight_report.html"));

    let body = test::read_body(response).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Dataset Analysis Report"));
    assert!(html.contains("id=\"correlations\""));

    assert_eq!(env.scratch_entries(), 0);
    assert_eq!(env.state.scratch.active_count(), 0);
}

#[actix_web::test]
async fn test_missing_dataset_is_bad_request() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;

    let response =
        test::call_service(&app, report_request(&[Part::text("template", "")]).to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "MISSING_DATASET");
    assert_eq!(json["error"], "No dataset file provided");
    assert_eq!(env.scratch_entries(), 0);
}

#[actix_web::test]
async fn test_dataset_without_filename_is_missing() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;

    let response =
        test::call_service(&app, report_request(&[Part::file("dataset", "", b"")]).to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "MISSING_DATASET");
}

#[actix_web::test]
async fn test_empty_and_binary_uploads_are_rejected_without_leftovers() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;

    let cases: [(&[u8], &str); 3] = [
        (b"", "EMPTY_DATASET"),
        (b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR", "INVALID_INPUT"),
        (b"a,b,c\n", "EMPTY_DATASET"),
    ];
    for (content, code) in cases {
        let response = test::call_service(
            &app,
            report_request(&[Part::file("dataset", "upload.csv", content)]).to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], code);
    }

    assert_eq!(env.scratch_entries(), 0);
}

#[actix_web::test]
async fn test_dataset_without_numeric_columns_succeeds() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;

    let csv = b"color,shape\nred,circle\nblue,square\nred,square\n";
    let response = test::call_service(
        &app,
        report_request(&[Part::file("dataset", "shapes.csv", csv)]).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(response).await.to_vec()).unwrap();
    assert!(!html.contains("Numeric correlation (Pearson)"));
}

#[actix_web::test]
async fn test_upload_over_limit_is_rejected() {
    let env = TestEnv::with_upload_limit(64);
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;
    let csv = sales_csv();

    let response = test::call_service(
        &app,
        report_request(&[Part::file("dataset", "sales.csv", &csv)]).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "UPLOAD_TOO_LARGE");
    assert_eq!(env.scratch_entries(), 0);
}

// ============================================================================
// Templates
// ============================================================================

#[actix_web::test]
async fn test_uploaded_template_is_used() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;
    let csv = sales_csv();

    let response = test::call_service(
        &app,
        report_request(&[
            Part::file("dataset", "sales.csv", &csv),
            Part::file(
                "template",
                "mine.html",
                b"rows={{ metadata.total_rows }};numeric={{ numeric_cols|join(',') }}",
            ),
        ]).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = test::read_body(response).await;
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        "rows=8;numeric=order_id,quantity,unit_price"
    );
    assert_eq!(env.scratch_entries(), 0);
}

#[actix_web::test]
async fn test_dataset_and_template_with_same_filename() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;
    let csv = sales_csv();

    let response = test::call_service(
        &app,
        report_request(&[
            Part::file("dataset", "data.csv", &csv),
            Part::file("template", "data.csv", b"rows={{ metadata.total_rows }}"),
        ])
        .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = test::read_body(response).await;
    assert_eq!(std::str::from_utf8(&body).unwrap(), "rows=8");
    assert_eq!(env.scratch_entries(), 0);
}

#[actix_web::test]
async fn test_named_template_from_templates_dir() {
    let env = TestEnv::new();
    fs::write(
        env.templates_dir.path().join("short.html"),
        "<p>{{ title }}: {{ shape[0] }} rows</p>",
    )
    .unwrap();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;
    let csv = sales_csv();

    let response = test::call_service(
        &app,
        report_request(&[
            Part::file("dataset", "sales.csv", &csv),
            Part::text("template", "short.html"),
        ]).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = test::read_body(response).await;
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        "<p>Dataset Analysis Report: 8 rows</p>"
    );
}

#[actix_web::test]
async fn test_unknown_named_template_is_server_error() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;
    let csv = sales_csv();

    let response = test::call_service(
        &app,
        report_request(&[
            Part::file("dataset", "sales.csv", &csv),
            Part::text("template", "does-not-exist.html"),
        ]).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["code"], "TEMPLATE_NOT_FOUND");
    assert_eq!(env.scratch_entries(), 0);
}

#[actix_web::test]
async fn test_template_name_with_traversal_is_rejected() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;
    let csv = sales_csv();

    let response = test::call_service(
        &app,
        report_request(&[
            Part::file("dataset", "sales.csv", &csv),
            Part::text("template", "../secrets.html"),
        ]).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_TEMPLATE_NAME");
}

// ============================================================================
// Concurrency
// ============================================================================

#[actix_web::test]
async fn test_concurrent_requests_do_not_collide() {
    let env = TestEnv::new();
    let app = test::init_service(App::new().app_data(env.state.clone()).configure(configure)).await;
    let csv = sales_csv();
    let template: &[u8] = b"{{ metadata.total_rows }}|{{ column_stats|length }}|\
        {{ correlations.numeric_img }}|{{ relationships.pairplot }}";

    let first = test::call_service(
        &app,
        report_request(&[
            Part::file("dataset", "sales.csv", &csv),
            Part::file("template", "t.html", template),
        ]).to_request(),
    );
    let second = test::call_service(
        &app,
        report_request(&[
            Part::file("dataset", "sales.csv", &csv),
            Part::file("template", "t.html", template),
        ]).to_request(),
    );
    let (first, second) = futures_util::future::join(first, second).await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    let first = test::read_body(first).await;
    let second = test::read_body(second).await;
    assert_eq!(first, second);
    assert!(std::str::from_utf8(&first).unwrap().starts_with("8|5|"));
    assert_eq!(env.scratch_entries(), 0);
}
