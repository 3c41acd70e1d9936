use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A user-selected file that has not been uploaded yet.
///
/// The content is shared, never copied: cloning a candidate for a retry
/// only bumps the reference count.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct CandidateFile {
    pub name: String,
    pub size_bytes: u64,
    #[derivative(Debug = "ignore")]
    content: Arc<[u8]>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size_bytes: content.len() as u64,
            content,
        }
    }

    /// Declared size can differ from the bytes on hand, e.g. when the size
    /// comes from file metadata read before the content.
    pub fn with_declared_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    pub fn content(&self) -> Arc<[u8]> {
        Arc::clone(&self.content)
    }
}

/// Per-file event reported while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Queued,
    Uploading(u8),
    Success,
    Error(String),
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileStatus {
    pub name: String,
    pub status: UploadStatus,
}

/// A file the remote service has accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFileRecord {
    pub file_id: String,
    pub stored_filename: String,
    pub original_name: String,
}

/// Result of one upload attempt. Exactly one per submitted file.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Success(UploadedFileRecord),
    Failure(FileError),
}

impl UploadOutcome {
    pub fn original_name(&self) -> &str {
        match self {
            UploadOutcome::Success(record) => &record.original_name,
            UploadOutcome::Failure(error) => &error.original_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub original_name: String,
    pub error_message: String,
}

/// Summary of the most recent validate + upload batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchStatus {
    pub success: bool,
    pub message: String,
    pub uploaded: Vec<UploadedFileRecord>,
    /// Files that failed validation.
    pub rejected: Vec<FileError>,
    /// Files that passed validation but failed to upload.
    pub failed: Vec<FileError>,
}

impl BatchStatus {
    /// Every per-file problem in the batch, rejected files first.
    pub fn errors(&self) -> impl Iterator<Item = &FileError> {
        self.rejected.iter().chain(self.failed.iter())
    }
}

/// Body of a successful `POST /upload/`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    pub file_id: String,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_debug_omits_content() {
        let file = CandidateFile::new("paper.pdf", vec![1u8, 2, 3]);
        let debug = format!("{:?}", file);
        assert!(debug.contains("paper.pdf"));
        assert!(!debug.contains("content"));
        assert_eq!(file.size_bytes, 3);
    }

    #[test]
    fn cloned_candidate_shares_content() {
        let file = CandidateFile::new("paper.pdf", vec![7u8; 16]);
        let retry = file.clone();
        assert!(Arc::ptr_eq(&file.content(), &retry.content()));
    }
}
