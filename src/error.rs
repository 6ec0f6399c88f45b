use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failures of the scan lifecycle, from upload lookup to persistence.
#[derive(Debug)]
pub enum ScanError {
    NotFound(String),
    IncompleteSubmission(String),
    OcrService(String),
    CorrectionService(String),
    ExtractionService(String),
    FieldExtractionParse {
        message: String,
        raw_response: String,
    },
    Persistence(String),
    Storage(std::io::Error),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ScanError::IncompleteSubmission(msg) => write!(f, "Incomplete submission: {msg}"),
            ScanError::OcrService(msg) => write!(f, "OCR service error: {msg}"),
            ScanError::CorrectionService(msg) => write!(f, "Text correction error: {msg}"),
            ScanError::ExtractionService(msg) => write!(f, "Field extraction error: {msg}"),
            ScanError::FieldExtractionParse { message, .. } => {
                write!(f, "Could not parse extracted fields: {message}")
            }
            ScanError::Persistence(msg) => write!(f, "Persistence error: {msg}"),
            ScanError::Storage(err) => write!(f, "Storage error: {err}"),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Storage(err)
    }
}

impl From<sqlx::Error> for ScanError {
    fn from(err: sqlx::Error) -> Self {
        ScanError::Persistence(err.to_string())
    }
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::NotFound(msg) => AppError::NotFound(msg),
            ScanError::IncompleteSubmission(msg) => AppError::BadRequest(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}
