use crate::upload::validator::MAX_FILE_SIZE;
use crate::upload::CandidateFile;
use glob::{MatchOptions, Pattern};
use ignore::Walk;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File types the upload picker offers.
pub const ACCEPTED_PATTERNS: [&str; 4] = ["*.pdf", "*.png", "*.jpg", "*.jpeg"];

/// Picks candidate files out of user-supplied paths, the way the file picker
/// would. Directories are walked recursively, honoring ignore files.
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    patterns: Vec<Pattern>,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::with_patterns(&ACCEPTED_PATTERNS)
    }
}

impl CandidateSelector {
    /// Invalid patterns are dropped.
    pub fn with_patterns(patterns: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "Ignoring invalid file pattern");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_accepted(&self, path: &Path) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.patterns.iter().any(|p| p.matches_with(name, options))
    }

    /// Accepted file paths under `roots`, in walk order.
    pub fn collect_paths(&self, roots: &[PathBuf]) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for root in roots {
            if root.is_file() {
                if self.is_accepted(root) {
                    paths.push(root.clone());
                } else {
                    debug!(path = %root.display(), "Skipping file with unaccepted type");
                }
                continue;
            }

            for entry in Walk::new(root) {
                match entry {
                    Ok(entry) if entry.path().is_file() && self.is_accepted(entry.path()) => {
                        paths.push(entry.path().to_path_buf());
                    }
                    Ok(_) => {}
                    Err(e) => warn!(root = %root.display(), error = %e, "Failed to walk directory entry"),
                }
            }
        }
        paths
    }

    /// Loads accepted files as candidates. Unreadable files are skipped.
    pub fn collect(&self, roots: &[PathBuf]) -> Vec<CandidateFile> {
        self.collect_paths(roots)
            .into_iter()
            .filter_map(|path| match load_candidate(&path) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read file");
                    None
                }
            })
            .collect()
    }
}

/// Files that validation will reject are not read: the candidate keeps its
/// on-disk size and empty content.
pub fn load_candidate(path: &Path) -> std::io::Result<CandidateFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let declared = fs::metadata(path)?.len();
    if declared == 0 || declared > MAX_FILE_SIZE {
        debug!(path = %path.display(), size = declared, "Not reading file that will fail validation");
        return Ok(CandidateFile::new(name, Vec::new()).with_declared_size(declared));
    }
    let content = fs::read(path)?;
    Ok(CandidateFile::new(name, content).with_declared_size(declared))
}
