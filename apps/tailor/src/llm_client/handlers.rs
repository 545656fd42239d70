//! Axum route handler for the raw completion endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::llm_client::CompletionContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(default)]
    pub prompt: String,
    /// Catalog template id; the optimize template when absent.
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub additional_context: CompletionContext,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    /// Fence-stripped model reply, guaranteed to parse as JSON.
    pub response: String,
}

/// POST /api/v1/llm/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    AppJson(request): AppJson<CompleteRequest>,
) -> Result<Json<CompleteResponse>, AppError> {
    let completion = state
        .llm
        .complete(
            &request.prompt,
            request.system_prompt.as_deref(),
            &request.additional_context,
        )
        .await?;

    Ok(Json(CompleteResponse {
        response: completion.text,
    }))
}
