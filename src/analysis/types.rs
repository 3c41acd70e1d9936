use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// A question label or mark as the model wrote it: `3`, `2.5` or `"2(b)"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(Number),
    Text(String),
}

impl NumberOrText {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            NumberOrText::Number(n) => n.as_u64(),
            NumberOrText::Text(t) => t.trim().parse().ok(),
        }
    }
}

impl fmt::Display for NumberOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberOrText::Number(n) => write!(f, "{}", n),
            NumberOrText::Text(t) => f.write_str(t),
        }
    }
}

/// One question extracted from the analyzed papers.
///
/// Fields come straight from model output, so a missing or null text field
/// reads as empty rather than failing the whole result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub question_number: Option<NumberOrText>,
    #[serde(default)]
    pub marks: Option<NumberOrText>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub qtype: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub question_text: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicFrequency {
    pub topic: String,
    pub frequency: u32,
    pub percentage: f64,
}

/// Topic breakdown as sent by the service. Older servers send an object
/// keyed by topic, newer ones a list sorted by frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicFrequencies {
    List(Vec<TopicFrequency>),
    Map(BTreeMap<String, f64>),
}

impl TopicFrequencies {
    pub fn len(&self) -> usize {
        match self {
            TopicFrequencies::List(list) => list.len(),
            TopicFrequencies::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Topic names in the order the service sent them.
    pub fn topics(&self) -> Vec<&str> {
        match self {
            TopicFrequencies::List(list) => list.iter().map(|t| t.topic.as_str()).collect(),
            TopicFrequencies::Map(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

/// Body of a successful `POST /analyze/multi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_questions: u64,
    pub topic_frequencies: TopicFrequencies,
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_file_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_file_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_before_dedup: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnalyzeRequest<'a> {
    pub file_ids: &'a [String],
}
