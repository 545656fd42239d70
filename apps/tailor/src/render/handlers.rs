//! Axum route handler for the LaTeX render endpoint.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default)]
    pub tex_doc: String,
    #[serde(default)]
    pub opts: RenderOptions,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenderOptions {
    /// `"base64"` returns `{ "pdf": <base64> }`; `"binary"` (default) returns raw bytes.
    pub encoding: Option<String>,
}

/// POST /api/v1/latex/render
pub async fn handle_render(
    State(state): State<AppState>,
    AppJson(request): AppJson<RenderRequest>,
) -> Result<Response, AppError> {
    let base64 = match request.opts.encoding.as_deref() {
        None | Some("binary") => false,
        Some("base64") => true,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unsupported encoding {other:?}; expected \"binary\" or \"base64\""
            )))
        }
    };

    let pdf = state.renderer.render(&request.tex_doc).await?;

    if base64 {
        return Ok(Json(json!({ "pdf": STANDARD.encode(&pdf) })).into_response());
    }
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("inline; filename=\"resume.pdf\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
