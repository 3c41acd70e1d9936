//! Client-side upload and analysis orchestration for the exam preparation
//! service: validate selected papers, upload them concurrently with progress
//! tracking, and request a multi-file analysis of everything uploaded.

pub mod analysis;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod upload;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use analysis::{AnalysisRequester, AnalysisResult};
pub use config::ClientConfig;
pub use error::{AnalysisError, TransportError, ValidationError};
pub use session::{AnalysisState, UploadSession};
pub use transport::{HttpClient, Transport};
pub use upload::{BatchStatus, CandidateFile, UploadCoordinator, UploadedFileRegistry};
