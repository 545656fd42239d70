use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "https://api.sambanova.ai/v1";
const DEFAULT_LLM_MODEL: &str = "Meta-Llama-3.1-70B-Instruct";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_JOB_FETCH_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
/// Fails at startup only on malformed values; every variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_dir: PathBuf,
    /// Absent key is not fatal: each LLM call reports it as a request error.
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    /// No timeout unless explicitly configured.
    pub llm_timeout_secs: Option<u64>,
    pub latex_compiler: String,
    pub render_work_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    /// Per-page timeout when fetching job listings.
    pub job_fetch_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            storage_dir: optional_env("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            llm_api_key: optional_env("LLM_API_KEY"),
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs: optional_env("LLM_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            latex_compiler: optional_env("LATEX_COMPILER")
                .unwrap_or_else(|| "pdflatex".to_string()),
            render_work_dir: optional_env("RENDER_WORK_DIR").map(PathBuf::from),
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MAX_UPLOAD_BYTES must be a byte count")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            job_fetch_timeout_secs: optional_env("JOB_FETCH_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("JOB_FETCH_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_JOB_FETCH_TIMEOUT_SECS),
        })
    }
}

/// Reads an environment variable, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
