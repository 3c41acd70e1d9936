mod http;

pub use http::HttpClient;

use crate::error::TransportError;
use crate::upload::CandidateFile;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const UPLOAD_PATH: &str = "/upload/";
pub const ANALYZE_MULTI_PATH: &str = "/analyze/multi";

/// Bytes handed to the network so far for one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub sent: u64,
    pub total: u64,
}

/// Invoked any number of times while an upload body is being sent.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Request transport to the exam analysis service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one file as multipart form data and returns the JSON body.
    async fn upload_file(
        &self,
        path: &str,
        file: &CandidateFile,
        timeout: Duration,
        on_progress: ProgressCallback,
    ) -> Result<Value, TransportError>;

    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError>;
}
