//! Axum route handlers for the Documents API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::documents::{
    extract_blocking, parsed_content, DocumentSummary, ParsedContent, ResumeSections,
};
use crate::errors::AppError;
use crate::state::AppState;

const PDF_MIME: &str = "application/pdf";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: String,
    pub original_filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub parsed: ParsedContent,
    pub sections: ResumeSections,
}

struct UploadedFile {
    filename: String,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents
///
/// Accepts exactly one `application/pdf` file. Text is extracted before the
/// document is stored, so an unreadable PDF leaves nothing behind.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let file = single_pdf(multipart?).await?;

    let parsed = extract_blocking(file.bytes.clone()).await?;
    let document = state.store.store(file.bytes, &file.filename).await?;
    state.store.store_parsed(&document.id, &parsed).await?;

    info!(
        "Uploaded {} as {} ({} lines)",
        document.original_filename,
        document.id,
        parsed.lines.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: document.id,
            original_filename: document.original_filename,
            uploaded_at: document.uploaded_at,
            sections: ResumeSections::scrape(&parsed.raw_text),
            parsed,
        }),
    ))
}

/// GET /api/v1/documents
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentSummary>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// GET /api/v1/documents/:id
///
/// Returns the stored PDF bytes.
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let document = state
        .store
        .load(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("document {id}")))?;

    let disposition = format!(
        "inline; filename=\"{}\"",
        document.original_filename.replace('"', "")
    );
    let disposition =
        HeaderValue::from_str(&disposition).unwrap_or_else(|_| HeaderValue::from_static("inline"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_MIME)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// DELETE /api/v1/documents/:id
///
/// Idempotent: unknown ids report `deleted: false` with a 200.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = state.store.delete(&id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

/// GET /api/v1/documents/:id/parsed
///
/// Extracted text, computed and cached on first request.
pub async fn handle_parsed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ParsedContent>, AppError> {
    parsed_content(state.store.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("document {id}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart helpers
// ────────────────────────────────────────────────────────────────────────────

/// Pulls the one PDF file out of the form. Non-file fields are ignored.
async fn single_pdf(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.body_text()))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if upload.is_some() {
            return Err(AppError::Upload(
                "Exactly one file may be uploaded at a time".to_string(),
            ));
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if content_type != PDF_MIME {
            return Err(AppError::Upload(format!(
                "Only {PDF_MIME} files are accepted, got {:?}",
                content_type
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Upload(e.body_text()))?;
        if bytes.is_empty() {
            return Err(AppError::Upload(format!("{filename} is empty")));
        }

        upload = Some(UploadedFile { filename, bytes });
    }

    upload.ok_or_else(|| AppError::Upload("No file was uploaded".to_string()))
}
