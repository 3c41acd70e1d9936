//! Upload page session: the uploaded files, the last batch summary and the
//! analysis state, with the actions a user can take on them.

mod state;

pub use state::AnalysisState;

use crate::analysis::{AnalysisRequester, AnalysisResult};
use crate::config::ClientConfig;
use crate::error::{AnalysisError, TransportError};
use crate::transport::{HttpClient, Transport};
use crate::upload::{
    BatchStatus, CandidateFile, FileStatus, UploadCoordinator, UploadProgressMap,
    UploadedFileRecord, UploadedFileRegistry,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

pub struct UploadSession {
    coordinator: UploadCoordinator,
    requester: AnalysisRequester,
    registry: UploadedFileRegistry,
    progress: UploadProgressMap,
    last_batch: Option<BatchStatus>,
    analysis: AnalysisState,
}

impl UploadSession {
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            coordinator: UploadCoordinator::new(transport.clone(), config.upload_timeout),
            requester: AnalysisRequester::new(transport, config.analysis_timeout),
            registry: UploadedFileRegistry::new(),
            progress: UploadProgressMap::new(),
            last_batch: None,
            analysis: AnalysisState::Idle,
        }
    }

    /// Session backed by the HTTP transport.
    pub fn connect(config: ClientConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpClient::new(config.clone())?);
        Ok(Self::new(transport, &config))
    }

    pub fn with_status_sender(mut self, sender: UnboundedSender<FileStatus>) -> Self {
        self.coordinator = self.coordinator.with_status_sender(sender);
        self
    }

    pub async fn upload_batch(&mut self, files: Vec<CandidateFile>) -> &BatchStatus {
        let status = self
            .coordinator
            .upload_batch(files, &mut self.registry, &mut self.progress)
            .await;
        self.last_batch.insert(status)
    }

    pub async fn retry_upload(&mut self, file: CandidateFile) -> &BatchStatus {
        let status = self
            .coordinator
            .retry_upload(file, &mut self.registry, &mut self.progress)
            .await;
        self.last_batch.insert(status)
    }

    /// Removing the last file also clears the batch summary.
    pub fn remove_file(&mut self, file_id: &str) -> Option<UploadedFileRecord> {
        let removed = self.registry.remove(file_id);
        if removed.is_some() && self.registry.is_empty() {
            self.last_batch = None;
        }
        removed
    }

    pub fn reset(&mut self) {
        info!("Resetting upload session");
        self.registry.clear();
        self.progress = UploadProgressMap::new();
        self.last_batch = None;
        self.analysis = AnalysisState::Idle;
    }

    pub fn can_analyze(&self) -> bool {
        !self.registry.is_empty() && !self.analysis.is_pending()
    }

    /// Analyzes a snapshot of the files registered right now.
    ///
    /// Dropping the returned future before it settles puts the session back
    /// to `Idle`, so the analysis can be requested again.
    pub async fn analyze(&mut self) -> Result<AnalysisResult, AnalysisError> {
        if self.registry.is_empty() {
            return Err(AnalysisError::EmptyRequest);
        }
        if self.analysis.is_pending() {
            return Err(AnalysisError::AlreadyPending);
        }

        let file_ids = self.registry.file_ids();
        let mut pending = PendingAnalysis::start(&mut self.analysis, file_ids.len());

        match self.requester.request_analysis(&file_ids).await {
            Ok(result) => {
                pending.settle(AnalysisState::Succeeded(result.clone()));
                Ok(result)
            }
            Err(err) => {
                pending.settle(AnalysisState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    pub fn uploaded_files(&self) -> &[UploadedFileRecord] {
        self.registry.list()
    }

    pub fn progress(&self) -> &UploadProgressMap {
        &self.progress
    }

    pub fn last_batch(&self) -> Option<&BatchStatus> {
        self.last_batch.as_ref()
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn status_text(&self) -> String {
        let uploaded = match self.registry.len() {
            0 => "No files uploaded".to_string(),
            n => format!("{} file(s) ready for analysis", n),
        };
        let analysis = self.analysis.status_text();
        if analysis.is_empty() {
            uploaded
        } else {
            format!("{} | {}", uploaded, analysis)
        }
    }
}

/// Holds the session's analysis state while a request is in flight.
struct PendingAnalysis<'a> {
    state: &'a mut AnalysisState,
}

impl<'a> PendingAnalysis<'a> {
    fn start(state: &'a mut AnalysisState, file_count: usize) -> Self {
        *state = AnalysisState::Pending { file_count };
        Self { state }
    }

    fn settle(&mut self, outcome: AnalysisState) {
        *self.state = outcome;
    }
}

impl Drop for PendingAnalysis<'_> {
    fn drop(&mut self) {
        if self.state.is_pending() {
            info!("Analysis request dropped before it settled");
            *self.state = AnalysisState::Idle;
        }
    }
}
