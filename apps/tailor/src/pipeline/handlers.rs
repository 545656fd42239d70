//! Axum route handlers for the end-to-end résumé pipeline.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::pipeline::{gap_analysis, optimize, GapAnalysisRequest, OptimizeOutcome, OptimizeRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GapAnalysisResponse {
    pub analysis: Value,
}

/// POST /api/v1/resumes/optimize
///
/// Upload (optional) → analyze → render. A render failure after a successful
/// analysis still returns 200 with `state: "failed"` and the LaTeX source.
pub async fn handle_optimize(
    State(state): State<AppState>,
    AppJson(request): AppJson<OptimizeRequest>,
) -> Result<Json<OptimizeOutcome>, AppError> {
    Ok(Json(optimize(&state, request).await?))
}

/// POST /api/v1/resumes/gap-analysis
pub async fn handle_gap_analysis(
    State(state): State<AppState>,
    AppJson(request): AppJson<GapAnalysisRequest>,
) -> Result<Json<GapAnalysisResponse>, AppError> {
    let analysis = gap_analysis(&state, request).await?;
    Ok(Json(GapAnalysisResponse { analysis }))
}
