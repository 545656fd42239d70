use std::sync::Arc;

use crate::config::Config;
use crate::documents::DocumentStore;
use crate::jobs::JobFetcher;
use crate::llm_client::LlmClient;
use crate::render::PdfRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Uploaded documents. Default: FsDocumentStore rooted at STORAGE_DIR.
    pub store: Arc<dyn DocumentStore>,
    pub llm: LlmClient,
    /// Default: LatexRenderer driving LATEX_COMPILER as a subprocess.
    pub renderer: Arc<dyn PdfRenderer>,
    pub jobs: JobFetcher,
    pub config: Config,
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::AppState;
    use crate::config::Config;
    use crate::documents::FsDocumentStore;
    use crate::jobs::JobFetcher;
    use crate::llm_client::testing::client_for;
    use crate::render::{PdfRenderer, RenderError};

    /// Renderer that returns a canned result without spawning anything.
    pub struct StubRenderer {
        failure: Mutex<Option<RenderError>>,
    }

    impl StubRenderer {
        pub fn ok() -> Self {
            Self {
                failure: Mutex::new(None),
            }
        }

        /// Fails the first render with `error`, succeeds afterwards.
        pub fn failing(error: RenderError) -> Self {
            Self {
                failure: Mutex::new(Some(error)),
            }
        }
    }

    #[async_trait]
    impl PdfRenderer for StubRenderer {
        async fn render(&self, _tex_source: &str) -> Result<Vec<u8>, RenderError> {
            match self.failure.lock().unwrap().take() {
                Some(error) => Err(error),
                None => Ok(b"%PDF-1.4".to_vec()),
            }
        }
    }

    pub fn test_config(storage_dir: &Path) -> Config {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            storage_dir: storage_dir.to_path_buf(),
            llm_api_key: Some("test-key".to_string()),
            llm_base_url: "http://127.0.0.1:9".to_string(),
            llm_model: "test-model".to_string(),
            llm_timeout_secs: None,
            latex_compiler: "pdflatex".to_string(),
            render_work_dir: None,
            max_upload_bytes: 1024 * 1024,
            job_fetch_timeout_secs: 5,
        }
    }

    pub async fn test_state(
        storage_dir: &Path,
        llm_base_url: &str,
        renderer: Arc<dyn PdfRenderer>,
    ) -> AppState {
        let config = test_config(storage_dir);
        AppState {
            store: Arc::new(FsDocumentStore::open(storage_dir).await.unwrap()),
            llm: client_for(llm_base_url, Some("test-key")),
            renderer,
            jobs: JobFetcher::new(Duration::from_secs(config.job_fetch_timeout_secs)).unwrap(),
            config,
        }
    }
}
