//! PDF text extraction: linear text across pages, no layout reconstruction.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// How far into the blob the `%PDF-` header may appear.
const HEADER_SCAN_BYTES: usize = 1024;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF is empty")]
    Empty,

    #[error("File is not a PDF document")]
    NotPdf,

    #[error("PDF could not be parsed: {0}")]
    Malformed(String),

    #[error("PDF contains no extractable text")]
    NoText,
}

/// Text derived from a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedContent {
    pub raw_text: String,
    /// Non-empty, trimmed lines of `raw_text` in reading order.
    pub lines: Vec<String>,
}

impl ParsedContent {
    /// Builds parsed content from already-extracted text.
    pub fn from_raw_text(raw_text: String) -> Result<Self, ExtractionError> {
        let lines: Vec<String> = raw_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        if lines.is_empty() {
            return Err(ExtractionError::NoText);
        }

        Ok(Self { raw_text, lines })
    }
}

/// Returns true when a `%PDF-` header appears near the start of the blob.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SCAN_BYTES)];
    head.windows(5).any(|w| w == b"%PDF-")
}

/// Extracts text from every page, in page order. All-or-nothing: any failure
/// discards whatever was read.
///
/// CPU-bound; callers on the async runtime should use `spawn_blocking`.
pub fn extract_text(bytes: &[u8]) -> Result<ParsedContent, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }
    if !looks_like_pdf(bytes) {
        return Err(ExtractionError::NotPdf);
    }

    // pdf_extract panics on some malformed inputs instead of returning errors.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| ExtractionError::Malformed("extractor panicked on malformed input".to_string()))?
    .map_err(|e| ExtractionError::Malformed(e.to_string()))?;

    debug!("Extracted text from {} PDF page(s)", pages.len());

    ParsedContent::from_raw_text(pages.join("\n"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_line_pdf_yields_two_trimmed_lines() {
        let pdf = fixtures::text_pdf(&["John Smith", "john@x.com"]);
        let parsed = extract_text(&pdf).unwrap();
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[0], "John Smith");
        assert_eq!(parsed.lines[1], "john@x.com");
    }

    #[test]
    fn test_empty_blob_is_rejected() {
        assert!(matches!(extract_text(&[]), Err(ExtractionError::Empty)));
    }

    #[test]
    fn test_non_pdf_blob_is_rejected() {
        let result = extract_text(b"PK\x03\x04 definitely a zip file");
        assert!(matches!(result, Err(ExtractionError::NotPdf)));
    }

    #[test]
    fn test_truncated_pdf_is_malformed() {
        let result = extract_text(b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog");
        assert!(matches!(result, Err(ExtractionError::Malformed(_))));
    }

    #[test]
    fn test_pdf_without_text_has_no_text() {
        let pdf = fixtures::text_pdf(&[]);
        assert!(matches!(extract_text(&pdf), Err(ExtractionError::NoText)));
    }

    #[test]
    fn test_from_raw_text_drops_blank_lines() {
        let parsed = ParsedContent::from_raw_text("\n\n  Jane Doe \n\t\n jane@y.org\n".into()).unwrap();
        assert_eq!(parsed.lines, vec!["Jane Doe", "jane@y.org"]);
    }

    #[test]
    fn test_from_raw_text_whitespace_only_is_no_text() {
        let result = ParsedContent::from_raw_text(" \n \t \n".into());
        assert!(matches!(result, Err(ExtractionError::NoText)));
    }

    #[test]
    fn test_header_may_follow_leading_garbage() {
        let mut bytes = vec![0u8; 16];
        bytes.extend_from_slice(b"%PDF-1.4");
        assert!(looks_like_pdf(&bytes));
        assert!(!looks_like_pdf(b"%PD"));
    }
}
