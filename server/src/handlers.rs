//! Request handlers.

use crate::AppState;
use crate::error::ApiError;
use actix_multipart::{Field, Multipart};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, post, web};
use data_insight::{DEFAULT_REPORT_FILENAME, InsightError, InsightResult, TemplateSource};
use futures_util::TryStreamExt;
use serde::Serialize;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

// ============================================================================
// Upload parsing
// ============================================================================

/// Scratch file names for the uploaded parts. Client file names are only logged.
const DATASET_FILE: &str = "dataset.csv";
const TEMPLATE_FILE: &str = "template.html";

/// An uploaded file part.
#[derive(Debug)]
struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

/// How the request selects a template.
#[derive(Debug, Default, PartialEq)]
enum TemplateChoice {
    #[default]
    Bundled,
    /// Template source sent as a file part.
    Upload { filename: String, bytes: Vec<u8> },
    /// Name of a file in the templates directory.
    Named(String),
}

#[derive(Debug, Default)]
struct ReportUpload {
    dataset: Option<UploadedFile>,
    template: TemplateChoice,
}

/// Read one field into memory, enforcing the shared upload budget.
async fn read_field(field: &mut Field, budget: &mut usize, limit: usize) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if chunk.len() > *budget {
            return Err(ApiError::UploadTooLarge { limit });
        }
        *budget -= chunk.len();
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_upload(mut payload: Multipart, limit: usize) -> Result<ReportUpload, ApiError> {
    let mut upload = ReportUpload::default();
    let mut budget = limit;

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let bytes = read_field(&mut field, &mut budget, limit).await?;

        match name.as_str() {
            "dataset" => {
                // a file input submitted without a selection has an empty filename
                let Some(filename) = filename.filter(|f| !f.is_empty()) else {
                    continue;
                };
                upload.dataset = Some(UploadedFile { filename, bytes });
            }
            "template" => {
                upload.template = template_choice(filename, bytes)?;
            }
            other => debug!("Ignoring unexpected form field '{}'", other),
        }
    }

    Ok(upload)
}

fn template_choice(filename: Option<String>, bytes: Vec<u8>) -> Result<TemplateChoice, ApiError> {
    match filename {
        Some(filename) => {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                Ok(TemplateChoice::Bundled)
            } else {
                Ok(TemplateChoice::Upload { filename, bytes })
            }
        }
        None => {
            let name = String::from_utf8(bytes)
                .map_err(|_| ApiError::InvalidTemplateName("<non UTF-8>".to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                Ok(TemplateChoice::Bundled)
            } else {
                validate_template_name(name)?;
                Ok(TemplateChoice::Named(name.to_string()))
            }
        }
    }
}

/// Template names must stay inside the templates directory.
fn validate_template_name(name: &str) -> Result<(), ApiError> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ApiError::InvalidTemplateName(name.to_string()));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /generate-report`
///
/// Multipart fields: `dataset` (required CSV file) and `template` (optional,
/// either a file part or the name of a template on the server).
#[post("/generate-report")]
pub async fn generate_report(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    process_upload(state, payload)
        .instrument(info_span!("generate_report", id = %request_id))
        .await
}

async fn process_upload(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let scratch = state.scratch.create()?;
    let upload = read_upload(payload, state.config.max_upload_bytes).await?;
    let dataset = upload.dataset.ok_or(InsightError::MissingDataset)?;
    info!(
        "Received '{}' ({} bytes)",
        dataset.filename,
        dataset.bytes.len()
    );

    let generator = state.generator.clone();
    let templates_dir = state.config.templates_dir.clone();
    let template_choice = upload.template;
    let span = tracing::Span::current();

    // the scratch guard moves into the task and is dropped when it ends
    let result = web::block(move || -> InsightResult<String> {
        let _entered = span.enter();

        let dataset_path = scratch.write_file(DATASET_FILE, &dataset.bytes)?;
        let template = match template_choice {
            TemplateChoice::Bundled => TemplateSource::Bundled,
            TemplateChoice::Named(name) => TemplateSource::File(templates_dir.join(name)),
            TemplateChoice::Upload { filename, bytes } => {
                debug!("Template uploaded as '{}'", filename);
                TemplateSource::File(scratch.write_file(TEMPLATE_FILE, &bytes)?)
            }
        };
        debug!("Using {}", template.describe());

        generator.generate_report_from_path(&dataset_path, &template)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("report task failed: {}", e)))?;

    let html = match result {
        Ok(html) => html,
        Err(e) => {
            error!("Report generation failed [{}]: {}", e.error_code(), e);
            return Err(e.into());
        }
    };

    info!("Report ready ({} bytes)", html.len());
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(
                DEFAULT_REPORT_FILENAME.to_string(),
            )],
        })
        .body(html))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// `GET /health`
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_name_validation() {
        assert!(validate_template_name("report.html").is_ok());
        assert!(validate_template_name("my-report.v2.html").is_ok());
        assert!(validate_template_name("../secret.html").is_err());
        assert!(validate_template_name("sub/report.html").is_err());
        assert!(validate_template_name("sub\\report.html").is_err());
        assert!(validate_template_name("..").is_err());
    }

    #[test]
    fn test_template_choice_from_parts() {
        assert_eq!(
            template_choice(None, b"  ".to_vec()).unwrap(),
            TemplateChoice::Bundled
        );
        assert_eq!(
            template_choice(Some("t.html".to_string()), Vec::new()).unwrap(),
            TemplateChoice::Bundled
        );
        assert_eq!(
            template_choice(None, b"summary.html\n".to_vec()).unwrap(),
            TemplateChoice::Named("summary.html".to_string())
        );
        assert_eq!(
            template_choice(Some("t.html".to_string()), b"{{ title }}".to_vec()).unwrap(),
            TemplateChoice::Upload {
                filename: "t.html".to_string(),
                bytes: b"{{ title }}".to_vec(),
            }
        );
        assert!(matches!(
            template_choice(None, b"../etc/passwd".to_vec()),
            Err(ApiError::InvalidTemplateName(_))
        ));
    }
}
