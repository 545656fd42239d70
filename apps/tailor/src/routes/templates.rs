use axum::Json;

use crate::templates::{TemplateSummary, CATALOG};

/// GET /api/v1/templates
/// Lists catalog ids usable as `systemPrompt` / `template`.
pub async fn list_templates_handler() -> Json<Vec<TemplateSummary>> {
    Json(CATALOG.list())
}
