//! PDF Render Bridge: compiles LaTeX source with an external compiler.
//!
//! Each render gets its own temporary working directory, removed on both the
//! success and failure paths, so concurrent renders never share files.
//! `AppState` holds an `Arc<dyn PdfRenderer>`; the default backend is
//! [`LatexRenderer`] driving `pdflatex` as a subprocess.

pub mod diagnostics;
pub mod handlers;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

const TEX_FILE: &str = "resume.tex";
const LOG_FILE: &str = "resume.log";
const PDF_FILE: &str = "resume.pdf";

/// Two passes let cross-references and page counts settle.
pub const DEFAULT_PASSES: usize = 2;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No LaTeX document provided")]
    EmptySource,

    #[error("LaTeX compilation failed")]
    Compilation { details: Vec<String> },

    #[error("Compiler finished without producing a PDF")]
    MissingOutput { details: Vec<String> },

    #[error("LaTeX compiler {program:?} could not be started: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Render workspace error: {0}")]
    Workspace(#[source] std::io::Error),
}

impl RenderError {
    /// Diagnostic lines for the client; empty for non-compiler failures.
    pub fn details(&self) -> &[String] {
        match self {
            RenderError::Compilation { details } | RenderError::MissingOutput { details } => {
                details
            }
            _ => &[],
        }
    }
}

/// Turns LaTeX source into PDF bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, tex_source: &str) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone)]
pub struct LatexRenderer {
    program: String,
    args: Vec<String>,
    passes: usize,
    work_root: Option<PathBuf>,
}

impl LatexRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![
                "-interaction=nonstopmode".to_string(),
                "-halt-on-error".to_string(),
            ],
            passes: DEFAULT_PASSES,
            work_root: None,
        }
    }

    /// Arguments placed before the `.tex` file name.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Parent directory for per-render working directories (system temp by default).
    pub fn with_work_root(mut self, work_root: Option<PathBuf>) -> Self {
        self.work_root = work_root;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn work_dir(&self) -> Result<tempfile::TempDir, RenderError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("latex-");
        let dir = match &self.work_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(RenderError::Workspace)
    }

    async fn compile_in(&self, dir: &Path, tex_source: &str) -> Result<Vec<u8>, RenderError> {
        tokio::fs::write(dir.join(TEX_FILE), tex_source)
            .await
            .map_err(RenderError::Workspace)?;

        for pass in 1..=self.passes {
            debug!("{} pass {pass}/{} in {}", self.program, self.passes, dir.display());

            let output = Command::new(&self.program)
                .args(&self.args)
                .arg(TEX_FILE)
                .current_dir(dir)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|source| RenderError::Unavailable {
                    program: self.program.clone(),
                    source,
                })?;

            if !output.status.success() {
                let details = diagnostics::collect(&dir.join(LOG_FILE), &output).await;
                warn!(
                    "{} failed on pass {pass} ({}): {:?}",
                    self.program, output.status, details
                );
                return Err(RenderError::Compilation { details });
            }
        }

        match tokio::fs::read(dir.join(PDF_FILE)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let log = tokio::fs::read(dir.join(LOG_FILE)).await.unwrap_or_default();
                Err(RenderError::MissingOutput {
                    details: diagnostics::error_lines(&String::from_utf8_lossy(&log)),
                })
            }
            Err(e) => Err(RenderError::Workspace(e)),
        }
    }
}

#[async_trait]
impl PdfRenderer for LatexRenderer {
    async fn render(&self, tex_source: &str) -> Result<Vec<u8>, RenderError> {
        if tex_source.trim().is_empty() {
            return Err(RenderError::EmptySource);
        }

        let dir = self.work_dir()?;
        let result = self.compile_in(dir.path(), tex_source).await;

        let path = dir.path().to_path_buf();
        if let Err(e) = dir.close() {
            warn!("Failed to remove render directory {}: {e}", path.display());
        }

        if let Ok(pdf) = &result {
            info!("Rendered PDF ({} bytes)", pdf.len());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Stand-in compiler: fails like pdflatex when braces are unbalanced,
    /// otherwise writes a stub PDF.
    const BRACE_CHECKER: &str = r#"
open=$(tr -cd '{' < "$1" | wc -c)
close=$(tr -cd '}' < "$1" | wc -c)
if [ "$open" -ne "$close" ]; then
  echo 'Runaway argument?' > resume.log
  echo '! File ended while scanning use of a macro argument.' >> resume.log
  echo '! Emergency stop.' >> resume.log
  exit 1
fi
printf '%%PDF-1.4\n%%stub\n' > resume.pdf
"#;

    const VALID_TEX: &str = "\\documentclass{article}\n\\begin{document}\n\\textbf{Hi}\n\\end{document}\n";
    const UNCLOSED_TEX: &str = "\\documentclass{article}\n\\begin{document}\n\\textbf{Hi\n\\end{document}\n";

    fn sh_renderer(script: &str, work_root: &TempDir) -> LatexRenderer {
        LatexRenderer::new("sh")
            .with_args(["-c", script, "sh"])
            .with_work_root(Some(work_root.path().to_path_buf()))
    }

    fn is_empty(dir: &TempDir) -> bool {
        std::fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_render_returns_pdf_and_cleans_up() {
        let root = TempDir::new().unwrap();
        let pdf = sh_renderer(BRACE_CHECKER, &root).render(VALID_TEX).await.unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(is_empty(&root));
    }

    #[tokio::test]
    async fn test_unclosed_brace_yields_marked_details_and_cleans_up() {
        let root = TempDir::new().unwrap();
        let err = sh_renderer(BRACE_CHECKER, &root)
            .render(UNCLOSED_TEX)
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Compilation { .. }));
        assert!(!err.details().is_empty());
        assert!(err.details().iter().any(|line| line.contains('!')));
        assert!(!err.details().iter().any(|line| line.contains("Runaway")));
        assert!(is_empty(&root));
    }

    #[tokio::test]
    async fn test_runs_two_passes() {
        let root = TempDir::new().unwrap();
        let counter = TempDir::new().unwrap();
        let passes = counter.path().join("passes");
        let script = format!(
            "echo pass >> '{}'\nprintf '%%PDF-1.4\\n' > resume.pdf",
            passes.display()
        );

        sh_renderer(&script, &root).render(VALID_TEX).await.unwrap();

        let count = std::fs::read_to_string(&passes).unwrap().lines().count();
        assert_eq!(count, DEFAULT_PASSES);
    }

    #[tokio::test]
    async fn test_unreadable_log_falls_back_to_process_error() {
        let root = TempDir::new().unwrap();
        let err = sh_renderer("echo 'kpathsea: fatal' >&2; exit 3", &root)
            .render(VALID_TEX)
            .await
            .unwrap_err();

        assert_eq!(
            err.details(),
            &["compiler exit status: 3".to_string(), "kpathsea: fatal".to_string()]
        );
        assert!(is_empty(&root));
    }

    #[tokio::test]
    async fn test_missing_pdf_is_reported() {
        let root = TempDir::new().unwrap();
        let err = sh_renderer("exit 0", &root).render(VALID_TEX).await.unwrap_err();
        assert!(matches!(err, RenderError::MissingOutput { .. }));
        assert!(is_empty(&root));
    }

    #[tokio::test]
    async fn test_missing_compiler_is_unavailable() {
        let root = TempDir::new().unwrap();
        let renderer = LatexRenderer::new("/nonexistent/pdflatex")
            .with_work_root(Some(root.path().to_path_buf()));

        let err = renderer.render(VALID_TEX).await.unwrap_err();
        assert!(matches!(err, RenderError::Unavailable { .. }));
        assert!(is_empty(&root));
    }

    #[tokio::test]
    async fn test_empty_source_never_spawns() {
        let root = TempDir::new().unwrap();
        let err = sh_renderer("exit 1", &root).render("  \n").await.unwrap_err();
        assert!(matches!(err, RenderError::EmptySource));
        assert!(is_empty(&root));
    }

    #[tokio::test]
    #[ignore = "requires a TeX installation"]
    async fn test_real_pdflatex_reports_unclosed_brace() {
        let root = TempDir::new().unwrap();
        let renderer =
            LatexRenderer::new("pdflatex").with_work_root(Some(root.path().to_path_buf()));

        let err = renderer.render(UNCLOSED_TEX).await.unwrap_err();
        assert!(err.details().iter().any(|line| line.starts_with('!')));
        assert!(is_empty(&root));
    }
}
