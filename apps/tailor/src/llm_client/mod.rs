//! LLM Client: the single point of entry for all hosted completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call the completion API directly.
//! All LLM interactions MUST go through this module.
//!
//! Exactly one attempt per call. Failures surface to the caller unretried.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::templates::{PromptTemplate, UnknownTemplateError, CATALOG};

pub mod handlers;
pub mod prompts;

use prompts::{
    JOB_LISTING_HEADING, JSON_ONLY_SYSTEM, RESPONSE_FORMAT_HEADING, RESUME_CONTENT_HEADING,
    USER_PROMPT_HEADING,
};

const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum LlmError {
    // Request class: the call never produced a usable upstream reply.
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error(transparent)]
    UnknownTemplate(#[from] UnknownTemplateError),

    #[error("LLM API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    // Response class: upstream answered, but not with usable JSON.
    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM reply is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Unexpected completion envelope: {0}")]
    MalformedEnvelope(String),
}

impl LlmError {
    /// True for errors caused by the caller's input rather than upstream.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, LlmError::EmptyPrompt | LlmError::UnknownTemplate(_))
    }

    /// True for replies that arrived but failed validation.
    pub fn is_response_error(&self) -> bool {
        matches!(
            self,
            LlmError::EmptyContent | LlmError::InvalidJson(_) | LlmError::MalformedEnvelope(_)
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI-compatible chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// Optional context placed ahead of the user prompt.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionContext {
    pub job_listing: Option<String>,
    #[serde(alias = "resumeText")]
    pub resume_content: Option<String>,
}

/// A validated model reply.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Reply with any Markdown code fence removed; always parses as JSON.
    pub text: String,
    pub json: Value,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

/// The single LLM client used by all services.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: settings.api_key,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Formats the request for `system_prompt_id` (default: the optimize
    /// template), issues one completion call and validates the reply as JSON.
    pub async fn complete(
        &self,
        user_prompt: &str,
        system_prompt_id: Option<&str>,
        context: &CompletionContext,
    ) -> Result<Completion, LlmError> {
        if user_prompt.trim().is_empty() {
            return Err(LlmError::EmptyPrompt);
        }
        let template = CATALOG.get_or_default(system_prompt_id)?;

        let system = format!("{}\n\n{}", template.system_prompt, JSON_ONLY_SYSTEM);
        let user = build_user_prompt(user_prompt, template, context);

        let text = self.call(&system, &user).await?;
        parse_completion(&text)
    }

    /// Makes one raw call and returns the text of the first choice.
    pub async fn call(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedEnvelope(e.to_string()))?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Concatenates the job listing, résumé text and response format ahead of the
/// user prompt. With no context the prompt is sent alone.
pub fn build_user_prompt(
    prompt: &str,
    template: &PromptTemplate,
    context: &CompletionContext,
) -> String {
    fn non_empty(s: &Option<String>) -> Option<&str> {
        s.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    let mut parts = Vec::new();
    if let Some(job) = non_empty(&context.job_listing) {
        parts.push(format!("{JOB_LISTING_HEADING}\n{job}"));
    }
    if let Some(resume) = non_empty(&context.resume_content) {
        parts.push(format!("{RESUME_CONTENT_HEADING}\n{resume}"));
    }
    if parts.is_empty() {
        return prompt.to_string();
    }

    parts.push(format!(
        "{RESPONSE_FORMAT_HEADING}\n{}",
        template.response_format()
    ));
    parts.push(format!("{USER_PROMPT_HEADING}\n{prompt}"));
    parts.join("\n\n")
}

/// Validates a raw reply: strips code fences, then requires valid JSON.
pub fn parse_completion(text: &str) -> Result<Completion, LlmError> {
    let stripped = strip_json_fences(text);
    if stripped.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    let json = serde_json::from_str(stripped).map_err(LlmError::InvalidJson)?;
    Ok(Completion {
        text: stripped.to_string(),
        json,
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{chat_reply, client_for, spawn};
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::templates::GAP_ANALYSIS_TEMPLATE;

    fn context() -> CompletionContext {
        CompletionContext {
            job_listing: Some("Senior Rust Engineer".to_string()),
            resume_content: Some("John Smith\njohn@x.com".to_string()),
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_completion_rejects_prose() {
        let err = parse_completion("Sure! Here is your resume: {name: John").unwrap_err();
        assert!(matches!(err, LlmError::InvalidJson(_)));
        assert!(err.is_response_error());
    }

    #[test]
    fn test_parse_completion_rejects_empty_fence() {
        assert!(matches!(parse_completion("```json\n```"), Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_user_prompt_orders_context_before_prompt() {
        let template = CATALOG.get(GAP_ANALYSIS_TEMPLATE).unwrap();
        let prompt = build_user_prompt("Find the gaps", template, &context());

        let job = prompt.find(JOB_LISTING_HEADING).unwrap();
        let resume = prompt.find(RESUME_CONTENT_HEADING).unwrap();
        let format = prompt.find(RESPONSE_FORMAT_HEADING).unwrap();
        let user = prompt.find(USER_PROMPT_HEADING).unwrap();
        assert!(job < resume && resume < format && format < user);
        assert!(prompt.ends_with("Find the gaps"));
        assert!(prompt.contains("missing_skills"));
    }

    #[test]
    fn test_user_prompt_without_context_is_prompt_alone() {
        let template = CATALOG.default_resume();
        let blank = CompletionContext {
            job_listing: Some("   ".to_string()),
            resume_content: None,
        };
        assert_eq!(build_user_prompt("hello", template, &blank), "hello");
    }

    #[test]
    fn test_user_prompt_trims_context_parts() {
        let template = CATALOG.default_resume();
        let padded = CompletionContext {
            job_listing: Some("\n  Senior Rust Engineer  \n".to_string()),
            resume_content: Some("   ".to_string()),
        };
        let prompt = build_user_prompt("Tailor it", template, &padded);

        assert!(prompt.starts_with(&format!("{JOB_LISTING_HEADING}\nSenior Rust Engineer\n\n")));
        assert!(!prompt.contains(RESUME_CONTENT_HEADING));
        assert!(prompt.ends_with(&format!("{USER_PROMPT_HEADING}\nTailor it")));
    }

    #[tokio::test]
    async fn test_empty_prompt_fails_before_any_call() {
        let upstream = spawn(StatusCode::OK, chat_reply("{}")).await;
        let err = upstream
            .client()
            .complete("  ", None, &context())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyPrompt));
        assert!(err.is_caller_error());
        assert_eq!(upstream.hits(), 0);
    }

    #[tokio::test]
    async fn test_unknown_template_is_caller_error() {
        let client = client_for("http://127.0.0.1:9", Some("k"));
        let err = client.complete("hi", Some("nope"), &context()).await.unwrap_err();
        assert!(matches!(err, LlmError::UnknownTemplate(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_request_error() {
        let client = client_for("http://127.0.0.1:9", None);
        let err = client.complete("hi", None, &context()).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
        assert!(!err.is_response_error());
    }

    #[tokio::test]
    async fn test_gap_analysis_with_invalid_json_reply_is_response_error() {
        let upstream = spawn(
            StatusCode::OK,
            chat_reply("Here are the gaps: {\"missing_skills\": [\"Kubernetes\""),
        )
        .await;

        let err = upstream
            .client()
            .complete("Find the gaps", Some(GAP_ANALYSIS_TEMPLATE), &context())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidJson(_)));
        assert_eq!(upstream.hits(), 1);
    }

    #[tokio::test]
    async fn test_fenced_json_reply_is_accepted() {
        let upstream = spawn(
            StatusCode::OK,
            chat_reply("```json\n{\"name\": \"John Smith\"}\n```"),
        )
        .await;

        let completion = upstream
            .client()
            .complete("Optimize", None, &context())
            .await
            .unwrap();
        assert_eq!(completion.json, json!({"name": "John Smith"}));
        assert_eq!(completion.text, "{\"name\": \"John Smith\"}");

        let request = upstream.last_request();
        assert_eq!(request["model"], "test-model");
        assert_eq!(request["stream"], false);
        assert_eq!(request["response_format"]["type"], "json_object");
        assert_eq!(request["messages"][0]["role"], "system");
        assert!(request["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Senior Rust Engineer"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_retried() {
        let upstream = spawn(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"error": {"message": "model overloaded"}}),
        )
        .await;

        let err = upstream
            .client()
            .complete("Optimize", None, &context())
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "model overloaded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(upstream.hits(), 1);
    }

    #[tokio::test]
    async fn test_empty_choice_is_empty_content() {
        let upstream = spawn(StatusCode::OK, json!({"choices": []})).await;
        let err = upstream
            .client()
            .complete("Optimize", None, &context())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
