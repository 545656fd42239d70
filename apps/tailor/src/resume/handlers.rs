//! Axum route handler for LaTeX generation.

use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::resume::{generate, generate_with, normalize, resume_template, GeneratedLatex};

#[derive(Debug, Deserialize)]
pub struct LatexRequest {
    /// Résumé JSON in any shape the normalizer understands.
    pub resume: Value,
    pub template: Option<String>,
}

/// POST /api/v1/resumes/latex
///
/// Normalizes the given résumé JSON and returns the generated LaTeX source.
pub async fn handle_generate_latex(
    AppJson(request): AppJson<LatexRequest>,
) -> Result<Json<GeneratedLatex>, AppError> {
    let layout = match request.template.as_deref() {
        Some(id) => Some(resume_template(Some(id))?.1),
        None => None,
    };
    let resume = normalize(&request.resume)?;

    Ok(Json(match layout {
        Some(layout) => generate_with(&resume, layout),
        None => generate(&resume),
    }))
}
