use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::documents::{ExtractionError, StorageError};
use crate::llm_client::LlmError;
use crate::pipeline::TransitionError;
use crate::render::RenderError;
use crate::resume::NormalizationError;
use crate::templates::UnknownTemplateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Body shape: `{ "error": <message>, "code": <CODE>, "details"?: <any> }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Invalid JSON body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error("Invalid multipart body: {0}")]
    MultipartBody(#[from] MultipartRejection),

    #[error(transparent)]
    UnknownTemplate(#[from] UnknownTemplateError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Pipeline error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Status, machine code, client message and optional details.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Upload(msg) => (StatusCode::BAD_REQUEST, "UPLOAD_ERROR", msg.clone(), None),
            AppError::JsonBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Invalid JSON request body".to_string(),
                Some(json!(rejection.body_text())),
            ),
            AppError::MultipartBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "UPLOAD_ERROR",
                rejection.body_text(),
                None,
            ),
            AppError::UnknownTemplate(e) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_TEMPLATE", e.to_string(), None)
            }
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
                None,
            ),
            AppError::Normalization(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NORMALIZATION_ERROR",
                e.to_string(),
                None,
            ),
            AppError::Storage(e @ StorageError::InvalidFilename(_)) => {
                (StatusCode::BAD_REQUEST, "UPLOAD_ERROR", e.to_string(), None)
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                    None,
                )
            }
            AppError::Llm(e) if e.is_caller_error() => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string(), None)
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e:?}");
                let code = if e.is_response_error() {
                    "LLM_RESPONSE_ERROR"
                } else {
                    "LLM_REQUEST_ERROR"
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "An AI processing error occurred".to_string(),
                    Some(json!(e.to_string())),
                )
            }
            AppError::Render(RenderError::EmptySource) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                RenderError::EmptySource.to_string(),
                None,
            ),
            AppError::Render(e @ RenderError::Unavailable { .. }) => {
                tracing::error!("Render transport error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "RENDER_TRANSPORT_ERROR",
                    "The LaTeX compiler is unavailable".to_string(),
                    None,
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}: {:?}", e.details());
                let details = (!e.details().is_empty()).then(|| json!(e.details()));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    e.to_string(),
                    details,
                )
            }
            AppError::Transition(e) => {
                tracing::error!("Pipeline error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}
