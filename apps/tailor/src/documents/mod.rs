//! Uploaded résumé documents: PDF text extraction, heuristic section scraping
//! and the local document store.

pub mod extract;
pub mod handlers;
pub mod sections;
pub mod store;

use bytes::Bytes;
use tracing::info;

pub use extract::{extract_text, ExtractionError, ParsedContent};
pub use sections::ResumeSections;
pub use store::{DocumentStore, DocumentSummary, FsDocumentStore, StorageError, StoredDocument};

use crate::errors::AppError;

/// Runs extraction on the blocking pool.
pub async fn extract_blocking(bytes: Bytes) -> Result<ParsedContent, AppError> {
    let parsed = tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;
    Ok(parsed)
}

/// Cached parsed content for `id`, extracting and caching it on first use.
/// `Ok(None)` when the document does not exist.
pub async fn parsed_content(
    store: &dyn DocumentStore,
    id: &str,
) -> Result<Option<ParsedContent>, AppError> {
    if let Some(parsed) = store.load_parsed(id).await? {
        return Ok(Some(parsed));
    }

    let Some(document) = store.load(id).await? else {
        return Ok(None);
    };

    let parsed = extract_blocking(document.bytes).await?;
    store.store_parsed(id, &parsed).await?;
    info!("Extracted and cached {} line(s) for {id}", parsed.lines.len());

    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::fixtures::text_pdf;

    #[tokio::test]
    async fn test_parsed_content_extracts_once_then_caches() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::open(dir.path()).await.unwrap();
        let doc = store
            .store(Bytes::from(text_pdf(&["John Smith", "john@x.com"])), "resume.pdf")
            .await
            .unwrap();

        assert!(store.load_parsed(&doc.id).await.unwrap().is_none());

        let parsed = parsed_content(&store, &doc.id).await.unwrap().unwrap();
        assert_eq!(parsed.lines, vec!["John Smith", "john@x.com"]);
        assert_eq!(store.load_parsed(&doc.id).await.unwrap(), Some(parsed));
    }

    #[tokio::test]
    async fn test_parsed_content_for_unknown_id_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::open(dir.path()).await.unwrap();
        let missing = parsed_content(&store, "resume.pdf-00000000-0000-0000-0000-000000000000-1")
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
