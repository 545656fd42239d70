//! Local document store: uploaded PDFs plus their parsed-text companions.
//!
//! Keys encode `{original_filename}-{uuid}-{timestamp_ms}` so the original
//! filename and upload time can be recovered from the id alone, without a
//! central allocator. Layout under the store root:
//!
//! ```text
//! pdfs/{original_filename}-{uuid}-{timestamp}.pdf
//! parsed/parsed-{uuid}-{timestamp}.txt
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::documents::extract::ParsedContent;

const PDF_DIR: &str = "pdfs";
const PARSED_DIR: &str = "parsed";
const UUID_LEN: usize = 36;
/// Longest accepted filename. The id suffix plus the temporary write
/// extension must still fit in a 255-byte directory entry.
pub const MAX_FILENAME_BYTES: usize = 160;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    #[error("Storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Keys
// ────────────────────────────────────────────────────────────────────────────

/// Parsed form of a document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKey {
    pub original_filename: String,
    pub uuid: Uuid,
    pub timestamp_ms: i64,
}

impl DocumentKey {
    pub fn new(original_filename: &str, uploaded_at: DateTime<Utc>) -> Result<Self, StorageError> {
        Ok(Self {
            original_filename: sanitize_filename(original_filename)?,
            uuid: Uuid::new_v4(),
            timestamp_ms: uploaded_at.timestamp_millis(),
        })
    }

    /// Parses an id of the form `{filename}-{uuid}-{timestamp}`.
    ///
    /// The uuid has a fixed width, so filenames may themselves contain `-`.
    pub fn parse(id: &str) -> Option<Self> {
        let (rest, timestamp) = id.rsplit_once('-')?;
        if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let timestamp_ms = timestamp.parse::<i64>().ok()?;

        let split = rest.len().checked_sub(UUID_LEN + 1)?;
        if !rest.is_char_boundary(split) || rest.as_bytes()[split] != b'-' {
            return None;
        }
        let uuid = Uuid::parse_str(&rest[split + 1..]).ok()?;
        let original_filename = &rest[..split];

        // Reject anything that could not have been produced by `new`.
        if sanitize_filename(original_filename).ok()? != original_filename {
            return None;
        }

        Some(Self {
            original_filename: original_filename.to_string(),
            uuid,
            timestamp_ms,
        })
    }

    pub fn id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.original_filename,
            self.uuid.hyphenated(),
            self.timestamp_ms
        )
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp_ms)
            .single()
            .unwrap_or_default()
    }

    fn pdf_path(&self, root: &Path) -> PathBuf {
        root.join(PDF_DIR).join(format!("{}.pdf", self.id()))
    }

    fn parsed_path(&self, root: &Path) -> PathBuf {
        root.join(PARSED_DIR).join(format!(
            "parsed-{}-{}.txt",
            self.uuid.hyphenated(),
            self.timestamp_ms
        ))
    }
}

/// Recovers the original upload filename from a document id.
#[cfg_attr(not(test), allow(dead_code))]
pub fn extract_original_filename(id: &str) -> Option<String> {
    DocumentKey::parse(id).map(|key| key.original_filename)
}

/// Reduces a client-supplied filename to its final path component.
/// Names longer than `MAX_FILENAME_BYTES` are rejected.
fn sanitize_filename(filename: &str) -> Result<String, StorageError> {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty()
        || base == "."
        || base == ".."
        || base.len() > MAX_FILENAME_BYTES
        || base.chars().any(char::is_control)
    {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(base.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Store trait
// ────────────────────────────────────────────────────────────────────────────

/// A user-uploaded PDF and its metadata. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub original_filename: String,
    pub bytes: Bytes,
    pub uploaded_at: DateTime<Utc>,
}

/// Listing entry; metadata is recovered from the id without reading the file.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub original_filename: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&DocumentKey> for DocumentSummary {
    fn from(key: &DocumentKey) -> Self {
        Self {
            id: key.id(),
            original_filename: key.original_filename.clone(),
            uploaded_at: key.uploaded_at(),
        }
    }
}

/// Storage backend for uploaded documents.
///
/// Carried in `AppState` as `Arc<dyn DocumentStore>`. Document deletion and
/// parsed-content deletion are not transactional.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store(&self, bytes: Bytes, filename: &str) -> Result<StoredDocument, StorageError>;

    async fn load(&self, id: &str) -> Result<Option<StoredDocument>, StorageError>;

    /// Idempotent: deleting an unknown id returns `Ok(false)`.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;

    /// Ids sorted newest first.
    async fn list(&self) -> Result<Vec<DocumentSummary>, StorageError>;

    async fn store_parsed(&self, id: &str, parsed: &ParsedContent) -> Result<(), StorageError>;

    async fn load_parsed(&self, id: &str) -> Result<Option<ParsedContent>, StorageError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Filesystem backend
// ────────────────────────────────────────────────────────────────────────────

pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        for dir in [root.join(PDF_DIR), root.join(PARSED_DIR)] {
            fs::create_dir_all(&dir).await.map_err(io_err(&dir))?;
        }
        info!("Document store opened at {}", root.display());
        Ok(Self { root })
    }
}

/// Writes via a temporary sibling and rename so readers never see partial files.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    fs::write(&tmp, contents).await.map_err(io_err(&tmp))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(io_err(path)(e));
    }
    Ok(())
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path)(e)),
    }
}

async fn remove_optional(path: &Path) -> Result<bool, StorageError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(path)(e)),
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn store(&self, bytes: Bytes, filename: &str) -> Result<StoredDocument, StorageError> {
        let uploaded_at = Utc::now();
        let key = DocumentKey::new(filename, uploaded_at)?;
        let path = key.pdf_path(&self.root);

        write_atomic(&path, &bytes).await?;
        info!("Stored document {} ({} bytes)", key.id(), bytes.len());

        Ok(StoredDocument {
            id: key.id(),
            original_filename: key.original_filename.clone(),
            bytes,
            uploaded_at: key.uploaded_at(),
        })
    }

    async fn load(&self, id: &str) -> Result<Option<StoredDocument>, StorageError> {
        let Some(key) = DocumentKey::parse(id) else {
            debug!("Rejecting unparseable document id {id:?}");
            return Ok(None);
        };

        Ok(read_optional(&key.pdf_path(&self.root))
            .await?
            .map(|bytes| StoredDocument {
                id: key.id(),
                original_filename: key.original_filename.clone(),
                bytes: Bytes::from(bytes),
                uploaded_at: key.uploaded_at(),
            }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let Some(key) = DocumentKey::parse(id) else {
            return Ok(false);
        };

        let deleted = remove_optional(&key.pdf_path(&self.root)).await?;
        if deleted {
            info!("Deleted document {id}");
            // Best-effort companion cleanup; a stale parse cache is harmless.
            if let Err(e) = remove_optional(&key.parsed_path(&self.root)).await {
                warn!("Document {id} deleted but parsed content was not: {e}");
            }
        }
        Ok(deleted)
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        let dir = self.root.join(PDF_DIR);
        let mut entries = fs::read_dir(&dir).await.map_err(io_err(&dir))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err(&dir))? {
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(|n| n.strip_suffix(".pdf")) else {
                continue;
            };
            if let Some(key) = DocumentKey::parse(id) {
                keys.push(key);
            }
        }

        keys.sort_by(|a, b| {
            b.timestamp_ms
                .cmp(&a.timestamp_ms)
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(keys.iter().map(DocumentSummary::from).collect())
    }

    async fn store_parsed(&self, id: &str, parsed: &ParsedContent) -> Result<(), StorageError> {
        let key = DocumentKey::parse(id)
            .ok_or_else(|| StorageError::InvalidId(id.to_string()))?;
        write_atomic(&key.parsed_path(&self.root), parsed.raw_text.as_bytes()).await?;
        debug!("Cached parsed content for {id} ({} lines)", parsed.lines.len());
        Ok(())
    }

    async fn load_parsed(&self, id: &str) -> Result<Option<ParsedContent>, StorageError> {
        let Some(key) = DocumentKey::parse(id) else {
            return Ok(None);
        };
        let Some(bytes) = read_optional(&key.parsed_path(&self.root)).await? else {
            return Ok(None);
        };

        let raw_text = String::from_utf8_lossy(&bytes).into_owned();
        // An unreadable cache entry is treated as a miss and re-derived by callers.
        Ok(ParsedContent::from_raw_text(raw_text).ok())
    }
}
