//! Error types for validation, transport and analysis.

use thiserror::Error;

pub const CONNECT_MESSAGE: &str =
    "Cannot connect to server. Please make sure the backend is running.";

pub const ANALYSIS_TIMEOUT_MESSAGE: &str = "Analysis is taking longer than expected. \
The server may still be processing your files; please try again in a moment or reduce the number of files.";

/// Local, pre-network rejection of a candidate file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("File too large ({size_mb:.2} MB). Maximum size is 10 MB")]
    TooLarge { size_mb: f64 },

    #[error("File is empty")]
    Empty,
}

/// Failure of a single request against the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not settle within its timeout.
    #[error("Request timed out")]
    Timeout,

    /// No response was received at all.
    #[error("{}", CONNECT_MESSAGE)]
    Connect,

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body could not be read as expected.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Reading the file content failed before sending.
    #[error("Failed to read file: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Builds the status error with the same wording the web client shows.
    /// The server's `detail` is only surfaced for 400 responses.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let message = match status {
            404 => "Resource not found".to_string(),
            500 => "Server error. Please try again later.".to_string(),
            400 => detail.unwrap_or_else(|| "Invalid request".to_string()),
            other => format!("Request failed with status {}", other),
        };
        TransportError::Status { status, message }
    }
}

/// Classified failure of an analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("No uploaded files to analyze")]
    EmptyRequest,

    #[error("An analysis is already in progress")]
    AlreadyPending,

    #[error("{}", ANALYSIS_TIMEOUT_MESSAGE)]
    Timeout,

    #[error("{0}")]
    Transport(String),

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),
}

impl From<TransportError> for AnalysisError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => AnalysisError::Timeout,
            TransportError::Malformed(msg) => AnalysisError::MalformedResponse(msg),
            other => AnalysisError::Transport(other.to_string()),
        }
    }
}
