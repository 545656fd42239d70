//! Axum route handler for job listing extraction.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::jobs::{extract_listings, JobExtraction, MAX_URLS};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractJobsRequest {
    pub urls: Vec<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtractJobsResponse {
    pub results: Vec<JobExtraction>,
}

/// POST /api/v1/jobs/extract
///
/// Always 200 for a valid request; per-URL failures are reported in `results`.
pub async fn handle_extract_jobs(
    State(state): State<AppState>,
    AppJson(request): AppJson<ExtractJobsRequest>,
) -> Result<Json<ExtractJobsResponse>, AppError> {
    let urls: Vec<String> = request
        .urls
        .iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();

    if urls.is_empty() {
        return Err(AppError::Validation("urls must contain at least one URL".to_string()));
    }
    if urls.len() > MAX_URLS {
        return Err(AppError::Validation(format!(
            "At most {MAX_URLS} URLs can be extracted per request"
        )));
    }

    let results = extract_listings(&state.jobs, &state.llm, &urls, request.prompt.as_deref()).await;
    Ok(Json(ExtractJobsResponse { results }))
}
