use crate::upload::types::UploadedFileRecord;
use tracing::debug;

/// Files uploaded during the current session, in completion order.
///
/// A record whose `file_id` is already present is rejected, so identifiers
/// stay unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedFileRegistry {
    records: Vec<UploadedFileRecord>,
}

impl UploadedFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the identifier was already registered.
    pub fn add(&mut self, record: UploadedFileRecord) -> bool {
        if self.contains(&record.file_id) {
            debug!(file_id = %record.file_id, "Ignoring duplicate uploaded file");
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn remove(&mut self, file_id: &str) -> Option<UploadedFileRecord> {
        let index = self.records.iter().position(|r| r.file_id == file_id)?;
        Some(self.records.remove(index))
    }

    pub fn list(&self) -> &[UploadedFileRecord] {
        &self.records
    }

    /// Identifier snapshot in registry order.
    pub fn file_ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.file_id.clone()).collect()
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.records.iter().any(|r| r.file_id == file_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
