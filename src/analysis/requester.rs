use crate::analysis::types::{AnalysisResult, AnalyzeRequest};
use crate::error::AnalysisError;
use crate::transport::{Transport, ANALYZE_MULTI_PATH};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Submits uploaded file identifiers for analysis and classifies failures.
pub struct AnalysisRequester {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl AnalysisRequester {
    /// `timeout` should be well above the transport default: analyzing
    /// several papers can take minutes.
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn request_analysis(&self, file_ids: &[String]) -> Result<AnalysisResult, AnalysisError> {
        self.request_analysis_with_timeout(file_ids, self.timeout).await
    }

    pub async fn request_analysis_with_timeout(
        &self,
        file_ids: &[String],
        timeout: Duration,
    ) -> Result<AnalysisResult, AnalysisError> {
        if file_ids.is_empty() {
            return Err(AnalysisError::EmptyRequest);
        }

        let body = serde_json::to_value(AnalyzeRequest { file_ids })
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        info!(files = file_ids.len(), timeout_secs = timeout.as_secs(), "Requesting analysis");
        let started = Instant::now();

        let response = self
            .transport
            .post_json(ANALYZE_MULTI_PATH, &body, timeout)
            .await
            .map_err(|err| {
                let err = AnalysisError::from(err);
                error!(error = %err, elapsed_secs = started.elapsed().as_secs(), "Analysis failed");
                err
            })?;

        let result: AnalysisResult = serde_json::from_value(response).map_err(|e| {
            error!(error = %e, "Analysis response is missing expected fields");
            AnalysisError::MalformedResponse(e.to_string())
        })?;

        info!(
            total_questions = result.total_questions,
            topics = result.topic_frequencies.len(),
            elapsed_secs = started.elapsed().as_secs(),
            "Analysis complete"
        );
        Ok(result)
    }
}
