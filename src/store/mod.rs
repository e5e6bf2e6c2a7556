//! Remote document storage: upload, processing-state polling, verification,
//! best-effort deletion.

pub mod gemini;

pub use gemini::GeminiFileStore;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File missing or empty: {}", .0.display())]
    InvalidFile(PathBuf),

    #[error("Remote processing failed for {label}")]
    ProcessingFailed { label: String },

    #[error("Rate limit exceeded after {attempts} upload attempts")]
    RateLimitExceeded { attempts: usize },

    #[error("Document store returned error (status {status}): {body}")]
    Remote { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Processing state of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Processing,
    Ready,
    Failed,
}

impl FileState {
    /// Remote state strings. Anything that is neither processing nor failed
    /// counts as ready, matching the store's terminal-state contract.
    pub fn from_remote(state: &str) -> Self {
        match state {
            "PROCESSING" => Self::Processing,
            "FAILED" => Self::Failed,
            _ => Self::Ready,
        }
    }
}

/// Metadata for a stored file, used for post-upload verification.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub name: String,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub state: FileState,
    pub uri: String,
}

/// Remote file service abstraction (allows mocking).
pub trait DocumentStore {
    /// Transmit the file and poll until its processing state is terminal.
    /// Returns the opaque handle used for prompt references and deletion.
    fn upload(&self, path: &Path, label: &str) -> Result<String, StoreError>;

    /// Best-effort deletion. Failure is logged, never raised — cleanup must
    /// not block workflow teardown.
    fn delete(&self, handle: &str) -> bool;

    /// Fetch size/state for verification. Callers display partial
    /// verification status without aborting.
    fn info(&self, handle: &str) -> Result<FileMetadata, StoreError>;
}

/// Upload precondition shared by implementations: the file exists and is
/// non-empty.
pub fn validate_local_file(path: &Path) -> Result<u64, StoreError> {
    let meta = std::fs::metadata(path).map_err(|_| StoreError::InvalidFile(path.to_path_buf()))?;
    if !meta.is_file() || meta.len() == 0 {
        return Err(StoreError::InvalidFile(path.to_path_buf()));
    }
    Ok(meta.len())
}

/// Mock store for testing — hands out sequential handles and records
/// deletions.
pub struct MockDocumentStore {
    counter: AtomicUsize,
    deleted: Mutex<Vec<String>>,
    fail_uploads: bool,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
            fail_uploads: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::new()
        }
    }

    pub fn deleted_handles(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Default for MockDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MockDocumentStore {
    fn upload(&self, path: &Path, label: &str) -> Result<String, StoreError> {
        if self.fail_uploads {
            return Err(StoreError::ProcessingFailed {
                label: label.to_string(),
            });
        }
        validate_local_file(path)?;
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("mock://files/{n}"))
    }

    fn delete(&self, handle: &str) -> bool {
        self.deleted.lock().unwrap().push(handle.to_string());
        true
    }

    fn info(&self, handle: &str) -> Result<FileMetadata, StoreError> {
        Ok(FileMetadata {
            name: handle.to_string(),
            display_name: "mock".into(),
            mime_type: "application/pdf".into(),
            size_bytes: 1024,
            state: FileState::Ready,
            uri: handle.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn remote_state_mapping() {
        assert_eq!(FileState::from_remote("PROCESSING"), FileState::Processing);
        assert_eq!(FileState::from_remote("FAILED"), FileState::Failed);
        assert_eq!(FileState::from_remote("ACTIVE"), FileState::Ready);
        assert_eq!(FileState::from_remote("SOMETHING_NEW"), FileState::Ready);
    }

    #[test]
    fn validate_rejects_missing_file() {
        let err = validate_local_file(Path::new("/nonexistent/drawing.pdf")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidFile(_)));
    }

    #[test]
    fn validate_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::File::create(&path).unwrap();
        assert!(matches!(
            validate_local_file(&path),
            Err(StoreError::InvalidFile(_))
        ));
    }

    #[test]
    fn validate_accepts_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.4 minimal").unwrap();
        assert_eq!(validate_local_file(&path).unwrap(), 16);
    }

    #[test]
    fn mock_store_hands_out_distinct_handles_and_records_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"pdf bytes").unwrap();

        let store = MockDocumentStore::new();
        let h1 = store.upload(&path, "Site Plan - a.pdf").unwrap();
        let h2 = store.upload(&path, "Sections - a.pdf").unwrap();
        assert_ne!(h1, h2);

        assert!(store.delete(&h1));
        assert_eq!(store.deleted_handles(), vec![h1]);
    }
}
