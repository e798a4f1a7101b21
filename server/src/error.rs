//! HTTP error mapping.
//!
//! Every failure leaves the server as JSON `{"error": ..., "code": ...}` with
//! 400 for problems with the request and 500 for everything else.

use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use data_insight::InsightError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Error raised by the report generator.
    #[error(transparent)]
    Insight(#[from] InsightError),

    /// The multipart body could not be read.
    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    UploadTooLarge { limit: usize },

    /// A template name that would escape the templates directory.
    #[error("Invalid template name: {0}")]
    InvalidTemplateName(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Insight(e) => e.error_code(),
            Self::Multipart(_) => "INVALID_UPLOAD",
            Self::UploadTooLarge { .. } => "UPLOAD_TOO_LARGE",
            Self::InvalidTemplateName(_) => "INVALID_TEMPLATE_NAME",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Insight(InsightError::Io(err))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Insight(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Insight(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Multipart(_) | Self::UploadTooLarge { .. } | Self::InvalidTemplateName(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            code: self.error_code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(InsightError::MissingDataset).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(InsightError::TemplateNotFound("x.html".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::InvalidTemplateName("../x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UploadTooLarge { limit: 10 }.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let response = ApiError::from(InsightError::MissingDataset).error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "No dataset file provided");
        assert_eq!(json["code"], "MISSING_DATASET");
    }
}
