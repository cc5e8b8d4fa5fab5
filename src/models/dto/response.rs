use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::assessment::{EvaluationResult, FlowPhase};
use crate::models::domain::question::{AssessmentKind, QuestionKind};

// ---------------------------------------------------------------------------
// Upstream quiz API responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedQuestionsResponse {
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

/// One question as the upstream service emits it. The expected answer has
/// shipped under several field names over time, so every known spelling is
/// accepted here and nowhere else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(
        default,
        alias = "correct_answer",
        alias = "correctAnswer",
        alias = "solution"
    )]
    pub answer: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChallengeResponse {
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationOutcome {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub time_taken: Option<f64>,
}

impl From<EvaluationOutcome> for EvaluationResult {
    fn from(outcome: EvaluationOutcome) -> Self {
        EvaluationResult {
            score: outcome.score,
            total: outcome.total,
            passed: outcome.passed,
            time_taken: outcome.time_taken,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound views
// ---------------------------------------------------------------------------

/// Snapshot of one assessment session, shaped for the frontend. Expected
/// answers and explanations stay hidden until the flow completes.
#[derive(Debug, Serialize)]
pub struct AssessmentView {
    pub id: Uuid,
    pub kind: AssessmentKind,
    pub phase: FlowPhase,
    pub started_at: DateTime<Utc>,
    pub current_question: usize,
    pub total_questions: usize,
    pub answered_count: usize,
    pub remaining_secs: u32,
    pub score: u32,
    pub retries_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: u32,
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u32>,
    pub answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
