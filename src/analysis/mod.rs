mod requester;
mod types;

pub use requester::AnalysisRequester;
pub use types::{AnalysisResult, NumberOrText, Question, TopicFrequencies, TopicFrequency};
