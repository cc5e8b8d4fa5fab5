use serde::{Deserialize, Serialize};

/// A single normalized assessment question. Upstream payloads arrive in
/// three different shapes; the adapters in `services::question_adapter`
/// map them all onto this one representation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    /// Sequence position, 1-based, assigned by the adapter.
    pub id: u32,
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub expected_answer: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u32>,
    pub points: u32,
}

impl Question {
    pub fn has_expected_answer(&self) -> bool {
        !self.expected_answer.trim().is_empty()
    }
}

/// The kind decides which answer-capture surface applies; scoring is a
/// strict string comparison against `expected_answer` for every kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    Coding,
    Essay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Aptitude,
    Mcq,
    Coding,
}

impl std::fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssessmentKind::Aptitude => write!(f, "aptitude"),
            AssessmentKind::Mcq => write!(f, "mcq"),
            AssessmentKind::Coding => write!(f, "coding"),
        }
    }
}
