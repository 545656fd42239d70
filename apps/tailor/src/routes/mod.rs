pub mod health;
pub mod templates;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::documents::handlers as documents;
use crate::jobs::handlers as jobs;
use crate::llm_client::handlers as llm;
use crate::pipeline::handlers as pipeline;
use crate::render::handlers as render;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Documents
        .route(
            "/api/v1/documents",
            get(documents::handle_list)
                .post(documents::handle_upload)
                .layer(upload_limit),
        )
        .route(
            "/api/v1/documents/:id",
            get(documents::handle_get).delete(documents::handle_delete),
        )
        .route(
            "/api/v1/documents/:id/parsed",
            get(documents::handle_parsed),
        )
        // Catalog
        .route(
            "/api/v1/templates",
            get(templates::list_templates_handler),
        )
        // LLM gateway
        .route("/api/v1/llm/complete", post(llm::handle_complete))
        // Render bridge
        .route("/api/v1/latex/render", post(render::handle_render))
        // Résumé pipeline
        .route(
            "/api/v1/resumes/latex",
            post(resume::handle_generate_latex),
        )
        .route(
            "/api/v1/resumes/gap-analysis",
            post(pipeline::handle_gap_analysis),
        )
        .route("/api/v1/resumes/optimize", post(pipeline::handle_optimize))
        // Job listings
        .route("/api/v1/jobs/extract", post(jobs::handle_extract_jobs))
        .with_state(state)
}
