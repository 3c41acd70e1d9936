use crate::analysis::AnalysisResult;
use crate::error::AnalysisError;

/// Observable state of the analysis request for the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Pending {
        file_count: usize,
    },
    Succeeded(AnalysisResult),
    Failed(AnalysisError),
}

impl AnalysisState {
    pub fn is_pending(&self) -> bool {
        matches!(self, AnalysisState::Pending { .. })
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn status_text(&self) -> String {
        match self {
            AnalysisState::Idle => String::new(),
            AnalysisState::Pending { file_count } => {
                format!("Analyzing {} file(s)... this can take a few minutes", file_count)
            }
            AnalysisState::Succeeded(result) => format!(
                "Analysis complete: {} question(s) across {} topic(s)",
                result.total_questions,
                result.topic_frequencies.len()
            ),
            AnalysisState::Failed(err) => format!("Analysis failed: {}", err),
        }
    }
}
