use crate::error::TransportError;
use crate::transport::{ProgressCallback, ProgressEvent, Transport, UPLOAD_PATH};
use crate::upload::progress::{percent, UploadProgressMap};
use crate::upload::registry::UploadedFileRegistry;
use crate::upload::types::{
    BatchStatus, CandidateFile, FileError, FileStatus, UploadOutcome, UploadResponse,
    UploadStatus, UploadedFileRecord,
};
use crate::upload::validator;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

/// Uploads a batch of candidate files and reconciles the per-file outcomes.
///
/// All uploads of a batch are driven from a single task. Completions and
/// progress events are handled one at a time as they arrive, and that loop is
/// the only writer of the registry and progress map. Queued progress events
/// are drained before a completion is handled.
pub struct UploadCoordinator {
    transport: Arc<dyn Transport>,
    upload_timeout: Duration,
    status_sender: Option<UnboundedSender<FileStatus>>,
}

impl UploadCoordinator {
    pub fn new(transport: Arc<dyn Transport>, upload_timeout: Duration) -> Self {
        Self {
            transport,
            upload_timeout,
            status_sender: None,
        }
    }

    /// Reports per-file status changes to a presentation layer.
    pub fn with_status_sender(mut self, sender: UnboundedSender<FileStatus>) -> Self {
        self.status_sender = Some(sender);
        self
    }

    pub async fn upload_batch(
        &self,
        files: Vec<CandidateFile>,
        registry: &mut UploadedFileRegistry,
        progress: &mut UploadProgressMap,
    ) -> BatchStatus {
        let (valid, invalid) = validator::partition(files);

        let rejected: Vec<FileError> = invalid
            .into_iter()
            .map(|(file, reason)| {
                warn!(file = %file.name, %reason, "Rejected file before upload");
                self.notify(&file.name, UploadStatus::Rejected(reason.to_string()));
                FileError {
                    original_name: file.name,
                    error_message: reason.to_string(),
                }
            })
            .collect();

        if valid.is_empty() {
            return BatchStatus {
                success: false,
                message: summarize(0, 0, &[], &rejected),
                uploaded: Vec::new(),
                rejected,
                failed: Vec::new(),
            };
        }

        info!(files = valid.len(), "Starting upload batch");

        let mut in_flight = InFlight::new(progress);
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<(String, ProgressEvent)>();
        let mut pending = FuturesUnordered::new();
        for file in &valid {
            in_flight.start(&file.name);
            self.notify(&file.name, UploadStatus::Queued);

            let tx = progress_tx.clone();
            let name = file.name.clone();
            let on_progress: ProgressCallback = Arc::new(move |event: ProgressEvent| {
                let _ = tx.send((name.clone(), event));
            });
            pending.push(self.upload_one(file, on_progress));
        }
        drop(progress_tx);

        let mut uploaded = Vec::new();
        let mut failed = Vec::new();

        while !pending.is_empty() {
            tokio::select! {
                biased;
                Some((name, event)) = progress_rx.recv() => {
                    let pct = percent(event.sent, event.total);
                    if in_flight.progress.update(&name, pct) {
                        debug!(file = %name, percent = pct, "Upload progress");
                        self.notify(&name, UploadStatus::Uploading(pct));
                    }
                }
                Some(outcome) = pending.next() => {
                    in_flight.finish(outcome.original_name());
                    match outcome {
                        UploadOutcome::Success(record) => {
                            info!(file = %record.original_name, file_id = %record.file_id, "Upload succeeded");
                            self.notify(&record.original_name, UploadStatus::Success);
                            registry.add(record.clone());
                            uploaded.push(record);
                        }
                        UploadOutcome::Failure(error) => {
                            warn!(file = %error.original_name, error = %error.error_message, "Upload failed");
                            self.notify(&error.original_name, UploadStatus::Error(error.error_message.clone()));
                            failed.push(error);
                        }
                    }
                }
                else => break,
            }
        }

        let message = summarize(uploaded.len(), valid.len(), &failed, &rejected);
        info!(
            uploaded = uploaded.len(),
            failed = failed.len(),
            rejected = rejected.len(),
            "Upload batch finished"
        );

        BatchStatus {
            success: !uploaded.is_empty(),
            message,
            uploaded,
            rejected,
            failed,
        }
    }

    /// Runs a fresh single-file batch for a file the user picked again.
    pub async fn retry_upload(
        &self,
        file: CandidateFile,
        registry: &mut UploadedFileRegistry,
        progress: &mut UploadProgressMap,
    ) -> BatchStatus {
        info!(file = %file.name, "Retrying upload");
        self.upload_batch(vec![file], registry, progress).await
    }

    async fn upload_one(&self, file: &CandidateFile, on_progress: ProgressCallback) -> UploadOutcome {
        let result = self
            .transport
            .upload_file(UPLOAD_PATH, file, self.upload_timeout, on_progress)
            .await
            .and_then(|body| {
                serde_json::from_value::<UploadResponse>(body)
                    .map_err(|e| TransportError::Malformed(e.to_string()))
            });

        match result {
            Ok(response) => UploadOutcome::Success(UploadedFileRecord {
                file_id: response.file_id,
                stored_filename: response.filename,
                original_name: file.name.clone(),
            }),
            Err(err) => UploadOutcome::Failure(FileError {
                original_name: file.name.clone(),
                error_message: self.describe(err),
            }),
        }
    }

    fn describe(&self, err: TransportError) -> String {
        match err {
            TransportError::Timeout => format!(
                "Upload timed out after {} seconds",
                self.upload_timeout.as_secs()
            ),
            other => other.to_string(),
        }
    }

    fn notify(&self, name: &str, status: UploadStatus) {
        if let Some(sender) = &self.status_sender {
            let _ = sender.send(FileStatus {
                name: name.to_string(),
                status,
            });
        }
    }
}

/// Progress entries started by one batch. Entries still held when the batch
/// is dropped mid-flight are removed, so the map never outlives the attempts.
struct InFlight<'a> {
    progress: &'a mut UploadProgressMap,
    names: Vec<String>,
}

impl<'a> InFlight<'a> {
    fn new(progress: &'a mut UploadProgressMap) -> Self {
        Self {
            progress,
            names: Vec::new(),
        }
    }

    fn start(&mut self, name: &str) {
        self.progress.start(name);
        self.names.push(name.to_string());
    }

    fn finish(&mut self, name: &str) {
        self.progress.finish(name);
        if let Some(index) = self.names.iter().position(|n| n == name) {
            self.names.swap_remove(index);
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        for name in self.names.drain(..) {
            debug!(file = %name, "Clearing progress for abandoned upload");
            self.progress.finish(&name);
        }
    }
}

fn summarize(succeeded: usize, attempted: usize, failed: &[FileError], rejected: &[FileError]) -> String {
    let mut parts = Vec::new();

    if attempted == 0 {
        parts.push("No valid files to upload".to_string());
    } else if succeeded > 0 {
        parts.push(format!(
            "Uploaded {} of {} file(s) successfully",
            succeeded, attempted
        ));
    } else {
        parts.push(format!("All {} upload(s) failed", attempted));
    }

    if !failed.is_empty() {
        parts.push(format!("Failed: {}", list_errors(failed)));
    }
    if !rejected.is_empty() {
        parts.push(format!("Invalid files: {}", list_errors(rejected)));
    }

    parts.join(". ")
}

fn list_errors(errors: &[FileError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.original_name, e.error_message))
        .collect::<Vec<_>>()
        .join(", ")
}
