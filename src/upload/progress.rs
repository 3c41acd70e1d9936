use std::collections::HashMap;

/// Upload percentage per in-flight file name.
///
/// An entry exists only while an attempt for that name is running.
///
/// Entries are keyed by file name alone. Two files with the same name in one
/// batch share an entry, and the first of them to settle removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadProgressMap {
    entries: HashMap<String, u8>,
}

impl UploadProgressMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, name: &str) {
        self.entries.insert(name.to_string(), 0);
    }

    /// Ignored for names that have already settled, since progress events
    /// can arrive after completion.
    pub fn update(&mut self, name: &str, percent: u8) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                *entry = percent.min(100);
                true
            }
            None => false,
        }
    }

    pub fn finish(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        self.entries.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Bytes sent scaled to an integer percentage.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((sent.min(total) * 100) / total) as u8
}
