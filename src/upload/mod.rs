mod coordinator;
mod progress;
mod registry;
mod types;
pub mod validator;

pub use coordinator::UploadCoordinator;
pub use progress::UploadProgressMap;
pub use registry::UploadedFileRegistry;
pub use types::{
    BatchStatus, CandidateFile, FileError, FileStatus, UploadOutcome, UploadStatus,
    UploadedFileRecord,
};
