//! Job listing extraction: fetches listing pages and turns each one into
//! structured JSON through the `job-extraction` catalog template.
//!
//! URLs are processed one at a time in request order. A failure on one URL is
//! recorded in its result and never aborts the others.

pub mod handlers;

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::DEFAULT_JOB_EXTRACTION_PROMPT;
use crate::llm_client::{CompletionContext, LlmClient, LlmError};
use crate::templates::JOB_EXTRACTION_TEMPLATE;

/// Most URLs accepted in one request.
pub const MAX_URLS: usize = 10;
/// Page text beyond this many characters is cut before prompting.
const MAX_PAGE_CHARS: usize = 20_000;

static HIDDEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>")
        .expect("valid hidden-content regex")
});
static BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*(?:br|li|/p|/div|/li|/tr|/h[1-6]|/section|/article)\b[^>]*>")
        .expect("valid line-break regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Invalid URL {0:?}: only http and https URLs are supported")]
    InvalidUrl(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Page has no readable text")]
    EmptyPage,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Outcome for one URL: exactly one of `result` and `error` is set.
#[derive(Debug, Serialize)]
pub struct JobExtraction {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetches listing pages and reduces them to plain text.
#[derive(Clone)]
pub struct JobFetcher {
    client: Client,
}

impl JobFetcher {
    pub fn new(timeout: Duration) -> Result<Self, JobError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Downloads `url` and returns its readable text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, JobError> {
        let url = parse_url(url)?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let text = html_to_text(&body);
        if text.is_empty() {
            return Err(JobError::EmptyPage);
        }
        Ok(text.chars().take(MAX_PAGE_CHARS).collect())
    }
}

fn parse_url(raw: &str) -> Result<Url, JobError> {
    Url::parse(raw.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .ok_or_else(|| JobError::InvalidUrl(raw.to_string()))
}

/// Strips markup from an HTML page: hidden blocks are dropped, block-level
/// tags become line breaks, and common entities are decoded.
pub fn html_to_text(html: &str) -> String {
    let visible = HIDDEN_RE.replace_all(html, " ");
    let broken = BREAK_RE.replace_all(&visible, "\n");
    let stripped = TAG_RE.replace_all(&broken, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetches one listing and runs it through the extraction template.
async fn extract_one(
    fetcher: &JobFetcher,
    llm: &LlmClient,
    url: &str,
    prompt: &str,
) -> Result<Value, JobError> {
    let page = fetcher.fetch_text(url).await?;
    let context = CompletionContext {
        job_listing: Some(page),
        resume_content: None,
    };
    let completion = llm
        .complete(prompt, Some(JOB_EXTRACTION_TEMPLATE), &context)
        .await?;
    Ok(completion.json)
}

/// Extracts every URL in order. `prompt` defaults to a generic extraction
/// request when absent or blank.
pub async fn extract_listings(
    fetcher: &JobFetcher,
    llm: &LlmClient,
    urls: &[String],
    prompt: Option<&str>,
) -> Vec<JobExtraction> {
    let prompt = prompt
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_JOB_EXTRACTION_PROMPT);

    let mut results = Vec::with_capacity(urls.len());
    for url in urls {
        let extraction = match extract_one(fetcher, llm, url, prompt).await {
            Ok(result) => {
                info!("Extracted job listing from {url}");
                JobExtraction {
                    url: url.clone(),
                    result: Some(result),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Job listing extraction failed for {url}: {e}");
                JobExtraction {
                    url: url.clone(),
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(extraction);
    }
    results
}


#[cfg(test)]
mod tests {
    use super::testing::{spawn_pages, LISTING_HTML};
    use super::*;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::llm_client::testing::{chat_reply, spawn};

    fn fetcher() -> JobFetcher {
        JobFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_html_to_text_keeps_visible_text_only() {
        assert_eq!(
            html_to_text(LISTING_HTML),
            "Careers\nSenior Rust Engineer\nAcme & Co. is hiring.\nBuild storage engines\nMentor engineers"
        );
    }

    #[test]
    fn test_html_to_text_of_plain_text_is_unchanged() {
        assert_eq!(html_to_text("Rust engineer\n\n  remote  "), "Rust engineer\nremote");
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        assert!(parse_url("https://example.com/jobs/1").is_ok());
        assert!(matches!(parse_url("ftp://example.com/job"), Err(JobError::InvalidUrl(_))));
        assert!(matches!(parse_url("not a url"), Err(JobError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_text_truncates_long_pages() {
        let app = axum::Router::new().route(
            "/long",
            axum::routing::get(|| async { "x".repeat(MAX_PAGE_CHARS + 500) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let text = fetcher().fetch_text(&format!("http://{addr}/long")).await.unwrap();
        assert_eq!(text.chars().count(), MAX_PAGE_CHARS);
    }

    #[tokio::test]
    async fn test_extract_listings_records_each_url_outcome() {
        let pages = spawn_pages().await;
        let upstream = spawn(
            StatusCode::OK,
            chat_reply(r#"{"title": "Senior Rust Engineer", "company": "Acme & Co."}"#),
        )
        .await;

        let urls = vec![
            format!("{pages}/listing"),
            format!("{pages}/gone"),
            "ftp://example.com/job".to_string(),
            format!("{pages}/blank"),
        ];
        let results = extract_listings(&fetcher(), &upstream.client(), &urls, None).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].url, urls[0]);
        assert_eq!(
            results[0].result,
            Some(json!({"title": "Senior Rust Engineer", "company": "Acme & Co."}))
        );
        assert!(results[0].error.is_none());
        assert!(results[1].error.as_deref().unwrap().contains("404"));
        assert!(results[2].error.as_deref().unwrap().starts_with("Invalid URL"));
        assert_eq!(results[3].error.as_deref(), Some("Page has no readable text"));
        assert!(results[1..].iter().all(|r| r.result.is_none()));

        // Only the readable page reached the model.
        assert_eq!(upstream.hits(), 1);
        let request = upstream.last_request();
        let system = request["messages"][0]["content"].as_str().unwrap();
        let user = request["messages"][1]["content"].as_str().unwrap();
        assert!(system.contains("job listing pages"));
        assert!(user.contains("Senior Rust Engineer"));
        assert!(!user.contains("trackPageView"));
        assert!(user.ends_with(DEFAULT_JOB_EXTRACTION_PROMPT));
    }

    #[tokio::test]
    async fn test_extract_listings_uses_caller_prompt() {
        let pages = spawn_pages().await;
        let upstream = spawn(StatusCode::OK, chat_reply(r#"{"title": "x"}"#)).await;

        extract_listings(
            &fetcher(),
            &upstream.client(),
            &[format!("{pages}/listing")],
            Some("  Focus on the salary range  "),
        )
        .await;

        let request = upstream.last_request();
        let user = request["messages"][1]["content"].as_str().unwrap();
        assert!(user.ends_with("Focus on the salary range"));
    }

    #[tokio::test]
    async fn test_invalid_model_reply_is_recorded_per_url() {
        let pages = spawn_pages().await;
        let upstream = spawn(StatusCode::OK, chat_reply("Here is the job: Rust")).await;

        let results = extract_listings(
            &fetcher(),
            &upstream.client(),
            &[format!("{pages}/listing")],
            None,
        )
        .await;
        assert!(results[0].result.is_none());
        assert!(results[0].error.as_deref().unwrap().contains("not valid JSON"));
    }
}
