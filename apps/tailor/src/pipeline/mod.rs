//! Upload → analyze → render sequencing.
//!
//! Each optimize request drives a short-lived [`PipelineRun`] through
//! `idle → (uploading) → analyzing → rendering → done | failed`. Nothing is
//! retried: a failed step ends the run and the caller re-submits.

pub mod handlers;

use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::documents::parsed_content;
use crate::errors::AppError;
use crate::llm_client::prompts::{DEFAULT_GAP_PROMPT, DEFAULT_OPTIMIZE_PROMPT};
use crate::llm_client::CompletionContext;
use crate::resume::{generate_with, normalize, resume_template, ResumeSchema};
use crate::state::AppState;
use crate::templates::GAP_ANALYSIS_TEMPLATE;

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Uploading,
    Analyzing,
    Rendering,
    Done,
    Failed,
}

impl PipelineState {
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Uploading)
                | (Idle, Analyzing)
                | (Uploading, Analyzing)
                | (Uploading, Failed)
                | (Analyzing, Rendering)
                | (Analyzing, Failed)
                | (Rendering, Done)
                | (Rendering, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid pipeline transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: PipelineState,
    pub to: PipelineState,
}

/// One entered state, with milliseconds since the run started.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub state: PipelineState,
    pub elapsed_ms: u64,
}

#[derive(Debug)]
pub struct PipelineRun {
    state: PipelineState,
    stages: Vec<Stage>,
    started: Instant,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            stages: vec![Stage {
                state: PipelineState::Idle,
                elapsed_ms: 0,
            }],
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn advance(&mut self, next: PipelineState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(next) {
            return Err(TransitionError {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.stages.push(Stage {
            state: next,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        });
        Ok(())
    }

    /// Marks the run failed and hands back the error that caused it.
    fn fail(&mut self, error: AppError) -> AppError {
        warn!("Pipeline failed while {:?}: {error}", self.state);
        if self.state.is_terminal() {
            return error;
        }
        if let Err(e) = self.advance(PipelineState::Failed) {
            return e.into();
        }
        error
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Requests / outcomes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub document_id: Option<String>,
    pub resume_text: Option<String>,
    #[serde(default)]
    pub job_description: String,
    pub template: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysisRequest {
    pub document_id: Option<String>,
    pub resume_text: Option<String>,
    #[serde(default)]
    pub job_description: String,
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderFailure {
    pub error: String,
    pub details: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeOutcome {
    pub state: PipelineState,
    pub stages: Vec<Stage>,
    pub resume: ResumeSchema,
    pub tex_source: String,
    pub required_packages: Vec<String>,
    /// Base64-encoded PDF when rendering succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<RenderFailure>,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

/// Full optimize pipeline. Failures before rendering are returned as errors;
/// a render failure still yields the analysis with `state = failed`.
pub async fn optimize(
    state: &AppState,
    request: OptimizeRequest,
) -> Result<OptimizeOutcome, AppError> {
    validate_source(request.document_id.as_deref(), request.resume_text.as_deref())?;
    validate_job_description(&request.job_description)?;
    let (template, layout) = resume_template(request.template.as_deref())?;

    let mut run = PipelineRun::new();
    let resume_text = ingest(state, &mut run, request.document_id, request.resume_text).await?;

    run.advance(PipelineState::Analyzing)?;
    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OPTIMIZE_PROMPT.to_string());
    let context = CompletionContext {
        job_listing: Some(request.job_description),
        resume_content: Some(resume_text),
    };
    let analyzed = match state.llm.complete(&prompt, Some(template.id), &context).await {
        Ok(completion) => normalize(&completion.json).map_err(AppError::from),
        Err(e) => Err(e.into()),
    };
    let resume = analyzed.map_err(|e| run.fail(e))?;
    let latex = generate_with(&resume, layout);

    run.advance(PipelineState::Rendering)?;
    let (pdf, failure) = match state.renderer.render(&latex.tex_source).await {
        Ok(bytes) => {
            run.advance(PipelineState::Done)?;
            (Some(STANDARD.encode(&bytes)), None)
        }
        Err(e) => {
            warn!("Render failed after analysis: {e}");
            run.advance(PipelineState::Failed)?;
            (
                None,
                Some(RenderFailure {
                    error: e.to_string(),
                    details: e.details().to_vec(),
                }),
            )
        }
    };

    info!(
        "Optimize pipeline finished as {:?} in {} stage(s)",
        run.state(),
        run.stages().len()
    );

    Ok(OptimizeOutcome {
        state: run.state(),
        stages: run.stages().to_vec(),
        resume,
        tex_source: latex.tex_source,
        required_packages: latex.required_packages,
        pdf,
        failure,
    })
}

/// Gap analysis: ingest plus one completion with the gap-analysis template.
pub async fn gap_analysis(state: &AppState, request: GapAnalysisRequest) -> Result<Value, AppError> {
    validate_source(request.document_id.as_deref(), request.resume_text.as_deref())?;
    validate_job_description(&request.job_description)?;

    let mut run = PipelineRun::new();
    let resume_text = ingest(state, &mut run, request.document_id, request.resume_text).await?;

    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GAP_PROMPT.to_string());
    let context = CompletionContext {
        job_listing: Some(request.job_description),
        resume_content: Some(resume_text),
    };
    let completion = state
        .llm
        .complete(&prompt, Some(GAP_ANALYSIS_TEMPLATE), &context)
        .await?;

    Ok(completion.json)
}

/// Résumé text from the stored document (uploading stage) or the request.
async fn ingest(
    state: &AppState,
    run: &mut PipelineRun,
    document_id: Option<String>,
    resume_text: Option<String>,
) -> Result<String, AppError> {
    let Some(id) = document_id else {
        return Ok(resume_text.unwrap_or_default());
    };

    run.advance(PipelineState::Uploading)?;
    match parsed_content(state.store.as_ref(), &id).await {
        Ok(Some(parsed)) => Ok(parsed.raw_text),
        Ok(None) => Err(run.fail(AppError::NotFound(format!("document {id}")))),
        Err(e) => Err(run.fail(e)),
    }
}

fn validate_source(document_id: Option<&str>, resume_text: Option<&str>) -> Result<(), AppError> {
    let has_text = resume_text.is_some_and(|t| !t.trim().is_empty());
    match (document_id, has_text) {
        (Some(_), true) => Err(AppError::Validation(
            "Provide either documentId or resumeText, not both".to_string(),
        )),
        (None, false) => Err(AppError::Validation(
            "documentId or resumeText is required".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_job_description(job_description: &str) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::extract::fixtures::text_pdf;
    use crate::llm_client::testing::{chat_reply, spawn};
    use crate::render::RenderError;
    use crate::state::testing::{test_state, StubRenderer};
    use axum::http::StatusCode;
    use bytes::Bytes;
    use std::sync::Arc;

    const REPLY: &str = r#"{"name": "John Smith", "contact": {"email": "john@x.com"},
        "experience": [{"company": "Acme", "title": "Engineer", "achievements": ["Shipped 3 services"]}]}"#;

    fn request(resume_text: Option<&str>, document_id: Option<String>) -> OptimizeRequest {
        OptimizeRequest {
            document_id,
            resume_text: resume_text.map(String::from),
            job_description: "Rust engineer".to_string(),
            template: None,
            prompt: None,
        }
    }

    fn states(outcome: &OptimizeOutcome) -> Vec<PipelineState> {
        outcome.stages.iter().map(|s| s.state).collect()
    }

    #[test]
    fn test_allowed_transitions() {
        use PipelineState::*;
        let mut run = PipelineRun::new();
        for next in [Uploading, Analyzing, Rendering, Done] {
            run.advance(next).unwrap();
        }
        assert!(run.state().is_terminal());
        assert_eq!(run.stages().len(), 5);
    }

    #[test]
    fn test_rejected_transitions() {
        use PipelineState::*;
        for (from, to) in [
            (Idle, Rendering),
            (Idle, Done),
            (Idle, Failed),
            (Analyzing, Uploading),
            (Done, Failed),
            (Failed, Analyzing),
            (Rendering, Analyzing),
        ] {
            assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
        }

        let mut run = PipelineRun::new();
        assert_eq!(
            run.advance(Done),
            Err(TransitionError { from: Idle, to: Done })
        );
        assert_eq!(run.state(), Idle);
    }

    #[tokio::test]
    async fn test_optimize_from_text_renders_pdf() {
        let upstream = spawn(StatusCode::OK, chat_reply(REPLY)).await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), &upstream.base_url, Arc::new(StubRenderer::ok())).await;

        let outcome = optimize(&state, request(Some("John Smith"), None)).await.unwrap();

        assert_eq!(outcome.state, PipelineState::Done);
        assert_eq!(
            states(&outcome),
            vec![
                PipelineState::Idle,
                PipelineState::Analyzing,
                PipelineState::Rendering,
                PipelineState::Done
            ]
        );
        assert_eq!(outcome.resume.name, "John Smith");
        assert!(outcome.tex_source.contains("Shipped 3 services"));
        assert_eq!(outcome.pdf.as_deref(), Some(STANDARD.encode(b"%PDF-1.4").as_str()));
        assert!(outcome.failure.is_none());
    }

    #[tokio::test]
    async fn test_optimize_from_document_passes_through_uploading() {
        let upstream = spawn(StatusCode::OK, chat_reply(REPLY)).await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), &upstream.base_url, Arc::new(StubRenderer::ok())).await;
        let doc = state
            .store
            .store(Bytes::from(text_pdf(&["John Smith", "john@x.com"])), "cv.pdf")
            .await
            .unwrap();

        let outcome = optimize(&state, request(None, Some(doc.id))).await.unwrap();

        assert_eq!(states(&outcome)[1], PipelineState::Uploading);
        let sent = upstream.last_request();
        let user = sent["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("john@x.com"));
        assert!(user.contains("Rust engineer"));
    }

    #[tokio::test]
    async fn test_render_failure_keeps_analysis() {
        let upstream = spawn(StatusCode::OK, chat_reply(REPLY)).await;
        let dir = tempfile::tempdir().unwrap();
        let renderer = StubRenderer::failing(RenderError::Compilation {
            details: vec!["! Undefined control sequence.".to_string()],
        });
        let state = test_state(dir.path(), &upstream.base_url, Arc::new(renderer)).await;

        let outcome = optimize(&state, request(Some("John Smith"), None)).await.unwrap();

        assert_eq!(outcome.state, PipelineState::Failed);
        assert!(outcome.pdf.is_none());
        assert_eq!(outcome.resume.name, "John Smith");
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.details, vec!["! Undefined control sequence."]);
    }

    #[tokio::test]
    async fn test_nameless_reply_is_normalization_error() {
        let upstream = spawn(StatusCode::OK, chat_reply(r#"{"experience": []}"#)).await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), &upstream.base_url, Arc::new(StubRenderer::ok())).await;

        let err = optimize(&state, request(Some("text"), None)).await.unwrap_err();
        assert!(matches!(err, AppError::Normalization(_)));
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let upstream = spawn(StatusCode::OK, chat_reply(REPLY)).await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), &upstream.base_url, Arc::new(StubRenderer::ok())).await;

        let err = optimize(
            &state,
            request(None, Some("cv.pdf-00000000-0000-0000-0000-000000000000-1".to_string())),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(upstream.hits(), 0);
    }

    #[tokio::test]
    async fn test_request_validation() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), "http://127.0.0.1:9", Arc::new(StubRenderer::ok())).await;

        let both = request(Some("text"), Some("id".to_string()));
        assert!(matches!(optimize(&state, both).await, Err(AppError::Validation(_))));

        let neither = request(Some("  "), None);
        assert!(matches!(optimize(&state, neither).await, Err(AppError::Validation(_))));

        let mut gap_template = request(Some("text"), None);
        gap_template.template = Some(GAP_ANALYSIS_TEMPLATE.to_string());
        assert!(matches!(optimize(&state, gap_template).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_gap_analysis_returns_reply_json() {
        let upstream = spawn(
            StatusCode::OK,
            chat_reply(r#"{"match_score": 70, "missing_skills": ["Kubernetes"]}"#),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), &upstream.base_url, Arc::new(StubRenderer::ok())).await;

        let analysis = gap_analysis(
            &state,
            GapAnalysisRequest {
                document_id: None,
                resume_text: Some("John Smith".to_string()),
                job_description: "Platform engineer".to_string(),
                prompt: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(analysis["missing_skills"][0], "Kubernetes");
        let system = upstream.last_request()["messages"][0]["content"].clone();
        assert!(system.as_str().unwrap().contains("skill and experience gaps"));
    }
}
